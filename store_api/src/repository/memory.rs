// store_api/src/repository/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{
  cart_key, cart_line_key, goods_key, line_total, order_key, CheckoutSummary, StoreError, StoreRepository, StoreResult,
};
use crate::models::{CartGoodsAdd, CartLine, Goods, GoodsUpdate, Order, OrderUpdate};
use crate::validation::amount_fits;

#[derive(Debug, Default)]
struct Tables {
  goods: BTreeMap<i64, Goods>,
  // Keyed like the `carts` primary key so iteration order matches `ORDER BY cart_id, goods_id`.
  carts: BTreeMap<(i64, i64), CartLine>,
  orders: BTreeMap<i64, Order>,
  last_order_id: i64,
}

impl Tables {
  fn price_of(&self, goods_id: i64) -> StoreResult<Decimal> {
    self
      .goods
      .get(&goods_id)
      .map(|goods| goods.price)
      .ok_or_else(|| StoreError::NotFound(goods_key(goods_id)))
  }

  fn lines_of(&self, cart_id: i64) -> Vec<CartLine> {
    self
      .carts
      .range((cart_id, i64::MIN)..=(cart_id, i64::MAX))
      .map(|(_, line)| line.clone())
      .collect()
  }
}

/// Process-local stand-in for the PostgreSQL store.
///
/// All tables sit behind one lock, so every operation (checkout included)
/// is atomic with respect to the others.
#[derive(Debug, Default)]
pub struct InMemoryStoreRepository {
  tables: Mutex<Tables>,
}

impl InMemoryStoreRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl StoreRepository for InMemoryStoreRepository {
  async fn goods_add(&self, goods: &Goods) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    if tables.goods.contains_key(&goods.goods_id) {
      return Err(StoreError::AlreadyExists(goods_key(goods.goods_id)));
    }
    tables.goods.insert(goods.goods_id, goods.clone());
    debug!(goods_id = goods.goods_id, "goods stored");
    Ok(())
  }

  async fn goods_get(&self, goods_id: i64) -> StoreResult<Goods> {
    self
      .tables
      .lock()
      .goods
      .get(&goods_id)
      .cloned()
      .ok_or_else(|| StoreError::NotFound(goods_key(goods_id)))
  }

  async fn goods_update(&self, goods_id: i64, update: &GoodsUpdate) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    let goods = tables
      .goods
      .get_mut(&goods_id)
      .ok_or_else(|| StoreError::NotFound(goods_key(goods_id)))?;
    goods.name = update.name.clone();
    goods.price = update.price;
    goods.quantity = update.quantity;
    Ok(())
  }

  async fn goods_delete(&self, goods_id: i64) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    if tables.goods.remove(&goods_id).is_none() {
      return Err(StoreError::NotFound(goods_key(goods_id)));
    }
    // ON DELETE CASCADE
    tables.carts.retain(|(_, line_goods_id), _| *line_goods_id != goods_id);
    Ok(())
  }

  async fn cart_create(&self, line: &CartLine) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    if !tables.goods.contains_key(&line.goods_id) {
      return Err(StoreError::NotFound(goods_key(line.goods_id)));
    }
    let key = (line.cart_id, line.goods_id);
    if tables.carts.contains_key(&key) {
      return Err(StoreError::AlreadyExists(cart_line_key(line.cart_id, line.goods_id)));
    }
    tables.carts.insert(key, line.clone());
    Ok(())
  }

  async fn cart_add_goods(&self, cart_id: i64, item: &CartGoodsAdd) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    let price = tables.price_of(item.goods_id)?;
    let key = (cart_id, item.goods_id);
    let (quantity, total) = tables
      .carts
      .get(&key)
      .map_or((0, Decimal::ZERO), |line| (line.quantity, line.total));

    let quantity = quantity.checked_add(item.quantity);
    let total = line_total(price, item.quantity)
      .and_then(|added| total.checked_add(added))
      .filter(|total| amount_fits(*total));
    let (Some(quantity), Some(total)) = (quantity, total) else {
      return Err(StoreError::OutOfRange(cart_line_key(cart_id, item.goods_id)));
    };

    tables.carts.insert(
      key,
      CartLine {
        cart_id,
        goods_id: item.goods_id,
        quantity,
        total,
      },
    );
    debug!(cart_id, goods_id = item.goods_id, quantity, "cart line upserted");
    Ok(())
  }

  async fn cart_get_goods(&self, cart_id: Option<i64>) -> StoreResult<Vec<Goods>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .carts
        .keys()
        .filter(|(line_cart_id, _)| cart_id.map_or(true, |wanted| wanted == *line_cart_id))
        .filter_map(|(_, goods_id)| tables.goods.get(goods_id).cloned())
        .collect(),
    )
  }

  async fn cart_get_lines(&self, cart_id: i64) -> StoreResult<Vec<CartLine>> {
    Ok(self.tables.lock().lines_of(cart_id))
  }

  async fn cart_update_goods(&self, cart_id: i64, goods_id: i64, quantity: i64) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    let price = tables.price_of(goods_id);
    let line = tables
      .carts
      .get_mut(&(cart_id, goods_id))
      .ok_or_else(|| StoreError::NotFound(cart_line_key(cart_id, goods_id)))?;
    line.total = line_total(price?, quantity).ok_or_else(|| StoreError::OutOfRange(cart_line_key(cart_id, goods_id)))?;
    line.quantity = quantity;
    Ok(())
  }

  async fn cart_delete_goods(&self, cart_id: i64, goods_id: i64) -> StoreResult<()> {
    self
      .tables
      .lock()
      .carts
      .remove(&(cart_id, goods_id))
      .map(|_| ())
      .ok_or_else(|| StoreError::NotFound(cart_line_key(cart_id, goods_id)))
  }

  async fn cart_delete(&self, cart_id: i64) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    let before = tables.carts.len();
    tables.carts.retain(|(line_cart_id, _), _| *line_cart_id != cart_id);
    if tables.carts.len() == before {
      return Err(StoreError::NotFound(cart_key(cart_id)));
    }
    Ok(())
  }

  async fn order_create(
    &self,
    cart_id: i64,
    order_time: DateTime<Utc>,
    finish_time: DateTime<Utc>,
  ) -> StoreResult<Order> {
    let mut tables = self.tables.lock();
    let lines = tables.lines_of(cart_id);
    let summary = CheckoutSummary::from_lines(cart_id, &lines)
      .inspect_err(|err| warn!("Checkout of cart {} rejected: {}", cart_id, err))?;

    // Check every line before touching stock so a rejection leaves nothing behind.
    for line in &lines {
      let available = tables
        .goods
        .get(&line.goods_id)
        .map(|goods| goods.quantity)
        .ok_or_else(|| StoreError::NotFound(goods_key(line.goods_id)))?;
      if available < line.quantity {
        return Err(StoreError::InsufficientStock {
          goods_id: line.goods_id,
          requested: line.quantity,
          available,
        });
      }
    }
    for line in &lines {
      if let Some(goods) = tables.goods.get_mut(&line.goods_id) {
        goods.quantity -= line.quantity;
      }
      tables.carts.remove(&(line.cart_id, line.goods_id));
    }

    tables.last_order_id += 1;
    let order = Order {
      order_id: tables.last_order_id,
      goods_id: summary.goods_id,
      quantity: summary.quantity,
      total: summary.total,
      order_time: Some(order_time),
      finish_time,
    };
    tables.orders.insert(order.order_id, order.clone());
    Ok(order)
  }

  async fn order_get(&self, order_id: i64) -> StoreResult<Order> {
    self
      .tables
      .lock()
      .orders
      .get(&order_id)
      .cloned()
      .ok_or_else(|| StoreError::NotFound(order_key(order_id)))
  }

  async fn order_update(&self, order_id: i64, update: &OrderUpdate) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    let order = tables
      .orders
      .get_mut(&order_id)
      .ok_or_else(|| StoreError::NotFound(order_key(order_id)))?;
    order.goods_id = update.goods_id;
    order.quantity = update.quantity;
    order.total = update.total;
    order.order_time = update.order_time;
    order.finish_time = update.finish_time;
    Ok(())
  }

  async fn order_delete(&self, order_id: i64) -> StoreResult<()> {
    self
      .tables
      .lock()
      .orders
      .remove(&order_id)
      .map(|_| ())
      .ok_or_else(|| StoreError::NotFound(order_key(order_id)))
  }
}
