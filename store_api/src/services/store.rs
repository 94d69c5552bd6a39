// store_api/src/services/store.rs

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result as AppResult};
use crate::models::{CartGoodsAdd, CartLine, Goods, GoodsUpdate, Order, OrderUpdate};
use crate::repository::{StoreRepository, StoreResult};

/// Pass-through over a [`StoreRepository`]: bounds each call by a deadline
/// and tags failures with the operation that produced them.
#[derive(Clone)]
pub struct StoreService {
  repository: Arc<dyn StoreRepository>,
  call_timeout: Duration,
  fulfillment_window: chrono::Duration,
}

impl StoreService {
  pub fn new(repository: Arc<dyn StoreRepository>, call_timeout: Duration, fulfillment_window: chrono::Duration) -> Self {
    Self {
      repository,
      call_timeout,
      fulfillment_window,
    }
  }

  async fn call<T, F>(&self, context: &'static str, operation: F) -> AppResult<T>
  where
    F: Future<Output = StoreResult<T>>,
  {
    match tokio::time::timeout(self.call_timeout, operation).await {
      Ok(result) => result.map_err(|err| AppError::from_store(context, err)),
      Err(_) => {
        warn!("Store call {} exceeded {:?}.", context, self.call_timeout);
        Err(AppError::Timeout(context))
      }
    }
  }

  pub async fn goods_add(&self, goods: &Goods) -> AppResult<()> {
    self.call("goods_add", self.repository.goods_add(goods)).await
  }

  pub async fn goods_get(&self, goods_id: i64) -> AppResult<Goods> {
    self.call("goods_get", self.repository.goods_get(goods_id)).await
  }

  pub async fn goods_update(&self, goods_id: i64, update: &GoodsUpdate) -> AppResult<()> {
    self.call("goods_update", self.repository.goods_update(goods_id, update)).await
  }

  pub async fn goods_delete(&self, goods_id: i64) -> AppResult<()> {
    self.call("goods_delete", self.repository.goods_delete(goods_id)).await
  }

  pub async fn cart_create(&self, line: &CartLine) -> AppResult<()> {
    self.call("cart_create", self.repository.cart_create(line)).await
  }

  pub async fn cart_add_goods(&self, cart_id: i64, item: &CartGoodsAdd) -> AppResult<()> {
    self.call("cart_add_goods", self.repository.cart_add_goods(cart_id, item)).await
  }

  pub async fn cart_get_goods(&self, cart_id: Option<i64>) -> AppResult<Vec<Goods>> {
    self.call("cart_get_goods", self.repository.cart_get_goods(cart_id)).await
  }

  pub async fn cart_get_lines(&self, cart_id: i64) -> AppResult<Vec<CartLine>> {
    self.call("cart_get_lines", self.repository.cart_get_lines(cart_id)).await
  }

  pub async fn cart_update_goods(&self, cart_id: i64, goods_id: i64, quantity: i64) -> AppResult<()> {
    self
      .call(
        "cart_update_goods",
        self.repository.cart_update_goods(cart_id, goods_id, quantity),
      )
      .await
  }

  pub async fn cart_delete_goods(&self, cart_id: i64, goods_id: i64) -> AppResult<()> {
    self
      .call("cart_delete_goods", self.repository.cart_delete_goods(cart_id, goods_id))
      .await
  }

  pub async fn cart_delete(&self, cart_id: i64) -> AppResult<()> {
    self.call("cart_delete", self.repository.cart_delete(cart_id)).await
  }

  /// Checks the cart out. The order is placed now and due after the configured fulfillment window.
  #[instrument(name = "service::order_create", skip(self))]
  pub async fn order_create(&self, cart_id: i64) -> AppResult<Order> {
    let order_time = Utc::now();
    let finish_time = order_time + self.fulfillment_window;
    let order = self
      .call(
        "order_create",
        self.repository.order_create(cart_id, order_time, finish_time),
      )
      .await?;
    info!("Order {} created from cart {}.", order.order_id, cart_id);
    Ok(order)
  }

  pub async fn order_get(&self, order_id: i64) -> AppResult<Order> {
    self.call("order_get", self.repository.order_get(order_id)).await
  }

  pub async fn order_update(&self, order_id: i64, update: &OrderUpdate) -> AppResult<()> {
    self.call("order_update", self.repository.order_update(order_id, update)).await
  }

  pub async fn order_delete(&self, order_id: i64) -> AppResult<()> {
    self.call("order_delete", self.repository.order_delete(order_id)).await
  }
}
