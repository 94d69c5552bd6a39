// store_api/src/models/goods.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{Validate, Violations};

/// A sellable item. `quantity` is the stock on hand.
///
/// Missing JSON fields fall back to their zero value so that the validator,
/// not the deserializer, reports them as required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct Goods {
  pub goods_id: i64,
  pub name: String,
  #[serde(with = "rust_decimal::serde::str")]
  pub price: Decimal,
  pub quantity: i64,
}

impl Validate for Goods {
  fn validate(&self, violations: &mut Violations) {
    violations.positive("goods_id", self.goods_id);
    violations.non_empty("name", &self.name);
    violations.amount("price", self.price);
    violations.non_negative("quantity", self.quantity);
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoodsUpdate {
  pub name: String,
  #[serde(with = "rust_decimal::serde::str")]
  pub price: Decimal,
  pub quantity: i64,
}

impl Validate for GoodsUpdate {
  fn validate(&self, violations: &mut Violations) {
    violations.non_empty("name", &self.name);
    violations.amount("price", self.price);
    violations.non_negative("quantity", self.quantity);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::str::FromStr;

  #[test]
  fn goods_serializes_price_as_string() {
    let goods = Goods {
      goods_id: 1,
      name: "Pen".to_string(),
      price: Decimal::from_str("1.50").unwrap(),
      quantity: 100,
    };
    assert_eq!(
      serde_json::to_value(&goods).unwrap(),
      json!({"goods_id": 1, "name": "Pen", "price": "1.50", "quantity": 100})
    );
  }

  #[test]
  fn missing_fields_are_reported_by_validation_not_serde() {
    let goods: Goods = serde_json::from_value(json!({"name": "Pen"})).unwrap();
    let mut violations = Violations::default();
    goods.validate(&mut violations);
    let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
    assert_eq!(fields, vec!["goods_id", "price"]);
  }

  #[test]
  fn zero_stock_is_allowed() {
    let update = GoodsUpdate {
      name: "Pen".to_string(),
      price: Decimal::new(150, 2),
      quantity: 0,
    };
    let mut violations = Violations::default();
    update.validate(&mut violations);
    assert!(violations.is_empty());
  }
}
