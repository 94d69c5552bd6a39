// store_api/src/models/cart.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{Validate, Violations};

/// One line of a cart, keyed by `(cart_id, goods_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct CartLine {
  pub cart_id: i64,
  pub goods_id: i64,
  pub quantity: i64,
  #[serde(with = "rust_decimal::serde::str")]
  pub total: Decimal,
}

impl Validate for CartLine {
  fn validate(&self, violations: &mut Violations) {
    violations.positive("cart_id", self.cart_id);
    violations.positive("goods_id", self.goods_id);
    violations.positive("quantity", self.quantity);
    violations.amount("total", self.total);
  }
}

/// Body of `PUT /carts/goods/add`. The line total is priced by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartGoodsAdd {
  pub goods_id: i64,
  pub quantity: i64,
}

impl Validate for CartGoodsAdd {
  fn validate(&self, violations: &mut Violations) {
    violations.positive("goods_id", self.goods_id);
    violations.positive("quantity", self.quantity);
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartGoodsUpdate {
  pub quantity: i64,
}

impl Validate for CartGoodsUpdate {
  fn validate(&self, violations: &mut Violations) {
    violations.positive("quantity", self.quantity);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(goods_id: i64, quantity: i64, total: i64) -> CartLine {
    CartLine {
      cart_id: 7,
      goods_id,
      quantity,
      total: Decimal::new(total, 2),
    }
  }

  #[test]
  fn cart_line_requires_positive_total() {
    let mut violations = Violations::default();
    line(1, 1, 0).validate(&mut violations);
    assert_eq!(violations.len(), 1);
  }

  #[test]
  fn cart_line_total_must_fit_its_column() {
    let mut violations = Violations::default();
    line(1, 1, 1_000_000_000_000).validate(&mut violations);
    let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
    assert_eq!(fields, vec!["total"]);
  }
}
