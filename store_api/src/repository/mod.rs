// store_api/src/repository/mod.rs

//! Data access for goods, carts and orders.
//!
//! [`StoreRepository`] is implemented once per backing store:
//! [`PgStoreRepository`] issues parameterized statements against PostgreSQL,
//! [`InMemoryStoreRepository`] keeps the same tables in process memory.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStoreRepository;
pub use postgres::PgStoreRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CartGoodsAdd, CartLine, Goods, GoodsUpdate, Order, OrderUpdate};
use crate::validation::amount_fits;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{0} not found")]
  NotFound(String),

  #[error("{0} already exists")]
  AlreadyExists(String),

  #[error("Insufficient stock for goods {goods_id}: requested {requested}, available {available}")]
  InsufficientStock { goods_id: i64, requested: i64, available: i64 },

  #[error("Quantity or total of {0} is out of range")]
  OutOfRange(String),

  #[error("Database operation '{op}' failed: {source}")]
  Database {
    op: &'static str,
    #[source]
    source: sqlx::Error,
  },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait StoreRepository: Send + Sync + 'static {
  async fn goods_add(&self, goods: &Goods) -> StoreResult<()>;
  async fn goods_get(&self, goods_id: i64) -> StoreResult<Goods>;
  async fn goods_update(&self, goods_id: i64, update: &GoodsUpdate) -> StoreResult<()>;
  async fn goods_delete(&self, goods_id: i64) -> StoreResult<()>;

  async fn cart_create(&self, line: &CartLine) -> StoreResult<()>;
  /// Upserts a line priced at the current goods price.
  async fn cart_add_goods(&self, cart_id: i64, item: &CartGoodsAdd) -> StoreResult<()>;
  /// Goods referenced by cart lines, one entry per line; all carts when `cart_id` is `None`.
  async fn cart_get_goods(&self, cart_id: Option<i64>) -> StoreResult<Vec<Goods>>;
  async fn cart_get_lines(&self, cart_id: i64) -> StoreResult<Vec<CartLine>>;
  async fn cart_update_goods(&self, cart_id: i64, goods_id: i64, quantity: i64) -> StoreResult<()>;
  async fn cart_delete_goods(&self, cart_id: i64, goods_id: i64) -> StoreResult<()>;
  async fn cart_delete(&self, cart_id: i64) -> StoreResult<()>;

  /// Checkout: turns every line of the cart into one order, decrements stock
  /// and empties the cart, all or nothing.
  async fn order_create(
    &self,
    cart_id: i64,
    order_time: DateTime<Utc>,
    finish_time: DateTime<Utc>,
  ) -> StoreResult<Order>;
  async fn order_get(&self, order_id: i64) -> StoreResult<Order>;
  async fn order_update(&self, order_id: i64, update: &OrderUpdate) -> StoreResult<()>;
  async fn order_delete(&self, order_id: i64) -> StoreResult<()>;
}

/// Aggregate of a cart at checkout time.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
  /// Goods of the first line, lowest goods id first.
  pub goods_id: i64,
  pub quantity: i64,
  pub total: Decimal,
}

impl CheckoutSummary {
  /// Fails with `NotFound` for an empty cart and `OutOfRange` when the sums
  /// do not fit an order row.
  pub fn from_lines(cart_id: i64, lines: &[CartLine]) -> StoreResult<Self> {
    let goods_id = lines
      .iter()
      .map(|line| line.goods_id)
      .min()
      .ok_or_else(|| StoreError::NotFound(cart_key(cart_id)))?;
    let quantity = lines.iter().try_fold(0_i64, |sum, line| sum.checked_add(line.quantity));
    let total = lines
      .iter()
      .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.total))
      .filter(|total| amount_fits(*total));
    match (quantity, total) {
      (Some(quantity), Some(total)) => Ok(Self { goods_id, quantity, total }),
      _ => Err(StoreError::OutOfRange(format!("order for {}", cart_key(cart_id)))),
    }
  }
}

/// `price * quantity`, rejected when it does not fit a money column.
pub(crate) fn line_total(price: Decimal, quantity: i64) -> Option<Decimal> {
  price.checked_mul(Decimal::from(quantity)).filter(|total| amount_fits(*total))
}

pub(crate) fn goods_key(goods_id: i64) -> String {
  format!("goods with id {}", goods_id)
}

pub(crate) fn cart_key(cart_id: i64) -> String {
  format!("cart with id {}", cart_id)
}

pub(crate) fn cart_line_key(cart_id: i64, goods_id: i64) -> String {
  format!("goods {} in cart {}", goods_id, cart_id)
}

pub(crate) fn order_key(order_id: i64) -> String {
  format!("order with id {}", order_id)
}
