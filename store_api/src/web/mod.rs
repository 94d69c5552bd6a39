// store_api/src/web/mod.rs

// Declare child modules
pub mod handlers;
pub mod routes;

pub use routes::configure_app_routes;

use actix_web::web::{Data, JsonConfig, QueryConfig, ServiceConfig};

use crate::errors::{json_error_handler, query_error_handler};
use crate::state::AppState;

/// Registers shared state, extractor error handlers and all routes.
///
/// Used by `main` for every worker and by the integration tests.
pub fn configure_app(app_state: AppState) -> impl FnOnce(&mut ServiceConfig) {
  move |cfg: &mut ServiceConfig| {
    cfg
      .app_data(Data::new(app_state))
      .app_data(JsonConfig::default().error_handler(json_error_handler))
      .app_data(QueryConfig::default().error_handler(query_error_handler));
    configure_app_routes(cfg);
  }
}
