// store_api/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{Validate, Violations};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
  pub order_id: i64,
  pub goods_id: i64,
  pub quantity: i64,
  #[serde(with = "rust_decimal::serde::str")]
  pub total: Decimal,
  pub order_time: Option<DateTime<Utc>>,
  pub finish_time: DateTime<Utc>,
}

/// Body of `POST /orders/create`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderCreate {
  pub cart_id: i64,
}

impl Validate for OrderCreate {
  fn validate(&self, violations: &mut Violations) {
    violations.positive("cart_id", self.cart_id);
  }
}

/// Wire form of an order update; `finish_time` is optional here only so a
/// missing value surfaces as a validation message. Convert with
/// [`Validator::check_into`](crate::validation::Validator::check_into).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderUpdatePayload {
  pub goods_id: i64,
  pub quantity: i64,
  #[serde(with = "rust_decimal::serde::str")]
  pub total: Decimal,
  pub order_time: Option<DateTime<Utc>>,
  pub finish_time: Option<DateTime<Utc>>,
}

impl Validate for OrderUpdatePayload {
  fn validate(&self, violations: &mut Violations) {
    violations.positive("goods_id", self.goods_id);
    violations.positive("quantity", self.quantity);
    violations.amount("total", self.total);
    violations.present("finish_time", self.finish_time.as_ref());
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
  pub goods_id: i64,
  pub quantity: i64,
  pub total: Decimal,
  pub order_time: Option<DateTime<Utc>>,
  pub finish_time: DateTime<Utc>,
}

impl TryFrom<OrderUpdatePayload> for OrderUpdate {
  type Error = Violations;

  fn try_from(payload: OrderUpdatePayload) -> Result<Self, Violations> {
    let mut violations = Violations::default();
    payload.validate(&mut violations);
    match payload.finish_time {
      Some(finish_time) if violations.is_empty() => Ok(Self {
        goods_id: payload.goods_id,
        quantity: payload.quantity,
        total: payload.total,
        order_time: payload.order_time,
        finish_time,
      }),
      _ => Err(violations),
    }
  }
}
