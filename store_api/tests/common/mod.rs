// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use store_api::config::AppConfig;
use store_api::repository::InMemoryStoreRepository;
use store_api::state::AppState;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Application state over a fresh in-memory store with default configuration.
pub fn memory_state() -> AppState {
  setup_tracing();
  AppState::new(Arc::new(InMemoryStoreRepository::new()), &AppConfig::default())
}

pub fn goods_json(goods_id: i64, name: &str, price: &str, quantity: i64) -> Value {
  json!({ "goods_id": goods_id, "name": name, "price": price, "quantity": quantity })
}

pub fn pen() -> Value {
  goods_json(1, "Pen", "1.50", 100)
}

pub fn notebook() -> Value {
  goods_json(2, "Notebook", "4.25", 3)
}
