// store_api/src/state.rs
use crate::config::AppConfig;
use crate::repository::StoreRepository;
use crate::services::StoreService;
use crate::validation::Validator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: StoreService,
  pub validator: Arc<Validator>,
}

impl AppState {
  /// Wires the service and validator around a repository, once per process.
  pub fn new(repository: Arc<dyn StoreRepository>, config: &AppConfig) -> Self {
    let store = StoreService::new(
      repository,
      config.database.query_timeout(),
      config.orders.fulfillment_window(),
    );
    Self {
      store,
      validator: Arc::new(Validator::default()),
    }
  }
}
