// store_api/src/repository/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use super::{cart_key, cart_line_key, goods_key, order_key, CheckoutSummary, StoreError, StoreRepository, StoreResult};
use crate::models::{CartGoodsAdd, CartLine, Goods, GoodsUpdate, Order, OrderUpdate};

const ORDER_COLUMNS: &str = "order_id, goods_id, quantity, total, order_time, finish_time";

// SQLSTATE numeric_value_out_of_range: BIGINT or NUMERIC(12, 2) overflow.
const OUT_OF_RANGE: &str = "22003";

fn db_error(op: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
  move |source| StoreError::Database { op, source }
}

/// Maps constraint violations on inserts to their domain meaning.
fn insert_error(op: &'static str, duplicate: String, missing: String) -> impl FnOnce(sqlx::Error) -> StoreError {
  move |source| {
    let violation = source
      .as_database_error()
      .map(|db| (db.is_unique_violation(), db.is_foreign_key_violation()));
    match violation {
      Some((true, _)) => StoreError::AlreadyExists(duplicate),
      Some((_, true)) => StoreError::NotFound(missing),
      _ => StoreError::Database { op, source },
    }
  }
}

/// Maps arithmetic overflow in a write to `OutOfRange` for `what`.
fn range_error(op: &'static str, what: String) -> impl FnOnce(sqlx::Error) -> StoreError {
  move |source| {
    let out_of_range = source
      .as_database_error()
      .and_then(|db| db.code())
      .map_or(false, |code| code == OUT_OF_RANGE);
    if out_of_range {
      StoreError::OutOfRange(what)
    } else {
      StoreError::Database { op, source }
    }
  }
}

fn expect_affected(rows: u64, what: impl FnOnce() -> String) -> StoreResult<()> {
  if rows == 0 {
    let what = what();
    warn!("No rows matched for {}.", what);
    return Err(StoreError::NotFound(what));
  }
  Ok(())
}

#[derive(Debug, Clone)]
pub struct PgStoreRepository {
  pool: PgPool,
}

impl PgStoreRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
  async fn goods_add(&self, goods: &Goods) -> StoreResult<()> {
    debug!(goods_id = goods.goods_id, "INSERT goods");
    sqlx::query("INSERT INTO goods (goods_id, name, price, quantity) VALUES ($1, $2, $3, $4)")
      .bind(goods.goods_id)
      .bind(&goods.name)
      .bind(goods.price)
      .bind(goods.quantity)
      .execute(&self.pool)
      .await
      .map_err(insert_error("goods_add", goods_key(goods.goods_id), goods_key(goods.goods_id)))?;
    Ok(())
  }

  async fn goods_get(&self, goods_id: i64) -> StoreResult<Goods> {
    debug!(goods_id, "SELECT goods");
    sqlx::query_as::<_, Goods>("SELECT goods_id, name, price, quantity FROM goods WHERE goods_id = $1")
      .bind(goods_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error("goods_get"))?
      .ok_or_else(|| StoreError::NotFound(goods_key(goods_id)))
  }

  async fn goods_update(&self, goods_id: i64, update: &GoodsUpdate) -> StoreResult<()> {
    debug!(goods_id, "UPDATE goods");
    let result = sqlx::query("UPDATE goods SET name = $1, price = $2, quantity = $3 WHERE goods_id = $4")
      .bind(&update.name)
      .bind(update.price)
      .bind(update.quantity)
      .bind(goods_id)
      .execute(&self.pool)
      .await
      .map_err(db_error("goods_update"))?;
    expect_affected(result.rows_affected(), || goods_key(goods_id))
  }

  async fn goods_delete(&self, goods_id: i64) -> StoreResult<()> {
    debug!(goods_id, "DELETE goods");
    let result = sqlx::query("DELETE FROM goods WHERE goods_id = $1")
      .bind(goods_id)
      .execute(&self.pool)
      .await
      .map_err(db_error("goods_delete"))?;
    expect_affected(result.rows_affected(), || goods_key(goods_id))
  }

  async fn cart_create(&self, line: &CartLine) -> StoreResult<()> {
    debug!(cart_id = line.cart_id, goods_id = line.goods_id, "INSERT cart line");
    sqlx::query("INSERT INTO carts (cart_id, goods_id, quantity, total) VALUES ($1, $2, $3, $4)")
      .bind(line.cart_id)
      .bind(line.goods_id)
      .bind(line.quantity)
      .bind(line.total)
      .execute(&self.pool)
      .await
      .map_err(insert_error(
        "cart_create",
        cart_line_key(line.cart_id, line.goods_id),
        goods_key(line.goods_id),
      ))?;
    Ok(())
  }

  async fn cart_add_goods(&self, cart_id: i64, item: &CartGoodsAdd) -> StoreResult<()> {
    debug!(cart_id, goods_id = item.goods_id, quantity = item.quantity, "UPSERT cart line");
    let result = sqlx::query(
      r#"
      INSERT INTO carts (cart_id, goods_id, quantity, total)
      SELECT $1::BIGINT, g.goods_id, $3::BIGINT, g.price * $3::BIGINT FROM goods g WHERE g.goods_id = $2
      ON CONFLICT (cart_id, goods_id) DO UPDATE
      SET quantity = carts.quantity + EXCLUDED.quantity, total = carts.total + EXCLUDED.total
      "#,
    )
    .bind(cart_id)
    .bind(item.goods_id)
    .bind(item.quantity)
    .execute(&self.pool)
    .await
    .map_err(range_error("cart_add_goods", cart_line_key(cart_id, item.goods_id)))?;
    expect_affected(result.rows_affected(), || goods_key(item.goods_id))
  }

  async fn cart_get_goods(&self, cart_id: Option<i64>) -> StoreResult<Vec<Goods>> {
    debug!(?cart_id, "SELECT goods JOIN carts");
    sqlx::query_as::<_, Goods>(
      r#"
      SELECT g.goods_id, g.name, g.price, g.quantity
      FROM goods g JOIN carts c ON g.goods_id = c.goods_id
      WHERE $1::BIGINT IS NULL OR c.cart_id = $1
      ORDER BY c.cart_id, g.goods_id
      "#,
    )
    .bind(cart_id)
    .fetch_all(&self.pool)
    .await
    .map_err(db_error("cart_get_goods"))
  }

  async fn cart_get_lines(&self, cart_id: i64) -> StoreResult<Vec<CartLine>> {
    debug!(cart_id, "SELECT cart lines");
    sqlx::query_as::<_, CartLine>(
      "SELECT cart_id, goods_id, quantity, total FROM carts WHERE cart_id = $1 ORDER BY goods_id",
    )
    .bind(cart_id)
    .fetch_all(&self.pool)
    .await
    .map_err(db_error("cart_get_lines"))
  }

  async fn cart_update_goods(&self, cart_id: i64, goods_id: i64, quantity: i64) -> StoreResult<()> {
    debug!(cart_id, goods_id, quantity, "UPDATE cart line");
    let result = sqlx::query(
      r#"
      UPDATE carts AS c SET quantity = $3, total = g.price * $3
      FROM goods AS g
      WHERE c.cart_id = $1 AND c.goods_id = $2 AND g.goods_id = c.goods_id
      "#,
    )
    .bind(cart_id)
    .bind(goods_id)
    .bind(quantity)
    .execute(&self.pool)
    .await
    .map_err(range_error("cart_update_goods", cart_line_key(cart_id, goods_id)))?;
    expect_affected(result.rows_affected(), || cart_line_key(cart_id, goods_id))
  }

  async fn cart_delete_goods(&self, cart_id: i64, goods_id: i64) -> StoreResult<()> {
    debug!(cart_id, goods_id, "DELETE cart line");
    let result = sqlx::query("DELETE FROM carts WHERE cart_id = $1 AND goods_id = $2")
      .bind(cart_id)
      .bind(goods_id)
      .execute(&self.pool)
      .await
      .map_err(db_error("cart_delete_goods"))?;
    expect_affected(result.rows_affected(), || cart_line_key(cart_id, goods_id))
  }

  async fn cart_delete(&self, cart_id: i64) -> StoreResult<()> {
    debug!(cart_id, "DELETE cart");
    let result = sqlx::query("DELETE FROM carts WHERE cart_id = $1")
      .bind(cart_id)
      .execute(&self.pool)
      .await
      .map_err(db_error("cart_delete"))?;
    expect_affected(result.rows_affected(), || cart_key(cart_id))
  }

  #[instrument(name = "repository::order_create", skip(self, order_time, finish_time))]
  async fn order_create(
    &self,
    cart_id: i64,
    order_time: DateTime<Utc>,
    finish_time: DateTime<Utc>,
  ) -> StoreResult<Order> {
    const OP: &str = "order_create";
    let mut tx = self.pool.begin().await.map_err(db_error(OP))?;

    // Lock order follows goods_id so concurrent checkouts cannot deadlock on stock rows.
    let lines = sqlx::query_as::<_, CartLine>(
      "SELECT cart_id, goods_id, quantity, total FROM carts WHERE cart_id = $1 ORDER BY goods_id FOR UPDATE",
    )
    .bind(cart_id)
    .fetch_all(&mut *tx)
    .await
    .map_err(db_error(OP))?;

    let summary = match CheckoutSummary::from_lines(cart_id, &lines) {
      Ok(summary) => summary,
      Err(err) => {
        warn!("Checkout of cart {} rejected: {}", cart_id, err);
        tx.rollback().await.map_err(db_error(OP))?;
        return Err(err);
      }
    };

    for line in &lines {
      let reserved = sqlx::query("UPDATE goods SET quantity = quantity - $2 WHERE goods_id = $1 AND quantity >= $2")
        .bind(line.goods_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await
        .map_err(db_error(OP))?
        .rows_affected();
      if reserved == 1 {
        continue;
      }

      let available: Option<i64> = sqlx::query_scalar("SELECT quantity FROM goods WHERE goods_id = $1")
        .bind(line.goods_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error(OP))?;
      tx.rollback().await.map_err(db_error(OP))?;
      return Err(match available {
        None => StoreError::NotFound(goods_key(line.goods_id)),
        Some(available) => {
          warn!(
            "Checkout of cart {} rejected: goods {} has {} in stock, {} requested.",
            cart_id, line.goods_id, available, line.quantity
          );
          StoreError::InsufficientStock {
            goods_id: line.goods_id,
            requested: line.quantity,
            available,
          }
        }
      });
    }

    let order = sqlx::query_as::<_, Order>(&format!(
      "INSERT INTO orders (goods_id, quantity, total, order_time, finish_time) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(summary.goods_id)
    .bind(summary.quantity)
    .bind(summary.total)
    .bind(order_time)
    .bind(finish_time)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_error(OP))?;

    // Only the locked lines: a line inserted after the SELECT stays in the cart.
    let ordered: Vec<i64> = lines.iter().map(|line| line.goods_id).collect();
    sqlx::query("DELETE FROM carts WHERE cart_id = $1 AND goods_id = ANY($2)")
      .bind(cart_id)
      .bind(ordered)
      .execute(&mut *tx)
      .await
      .map_err(db_error(OP))?;

    tx.commit().await.map_err(db_error(OP))?;
    info!(
      "Cart {} checked out as order {} ({} lines).",
      cart_id,
      order.order_id,
      lines.len()
    );
    Ok(order)
  }

  async fn order_get(&self, order_id: i64) -> StoreResult<Order> {
    debug!(order_id, "SELECT order");
    sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE order_id = $1", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error("order_get"))?
      .ok_or_else(|| StoreError::NotFound(order_key(order_id)))
  }

  async fn order_update(&self, order_id: i64, update: &OrderUpdate) -> StoreResult<()> {
    debug!(order_id, "UPDATE order");
    let result = sqlx::query(
      r#"
      UPDATE orders SET goods_id = $1, quantity = $2, total = $3, order_time = $4, finish_time = $5
      WHERE order_id = $6
      "#,
    )
    .bind(update.goods_id)
    .bind(update.quantity)
    .bind(update.total)
    .bind(update.order_time)
    .bind(update.finish_time)
    .bind(order_id)
    .execute(&self.pool)
    .await
    .map_err(db_error("order_update"))?;
    expect_affected(result.rows_affected(), || order_key(order_id))
  }

  async fn order_delete(&self, order_id: i64) -> StoreResult<()> {
    debug!(order_id, "DELETE order");
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM orders WHERE order_id = $1")
      .bind(order_id)
      .fetch_one(&self.pool)
      .await
      .map_err(db_error("order_delete"))?;
    if count == 0 {
      warn!("Order {} not found for deletion.", order_id);
      return Err(StoreError::NotFound(order_key(order_id)));
    }

    sqlx::query("DELETE FROM orders WHERE order_id = $1")
      .bind(order_id)
      .execute(&self.pool)
      .await
      .map_err(db_error("order_delete"))?;
    Ok(())
  }
}
