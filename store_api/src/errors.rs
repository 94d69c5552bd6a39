// store_api/src/errors.rs

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::repository::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Malformed Request Body: {0}")]
  MalformedBody(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Deadline exceeded in {0}")]
  Timeout(&'static str),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error in {context}: {source}")]
  Database {
    context: &'static str,
    #[source]
    source: sqlx::Error,
  },
}

impl AppError {
  /// Attaches the service call site to a data-layer failure.
  pub fn from_store(context: &'static str, err: StoreError) -> Self {
    match err {
      StoreError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
      StoreError::AlreadyExists(what) => AppError::Conflict(format!("{} already exists", what)),
      err @ (StoreError::InsufficientStock { .. } | StoreError::OutOfRange(_)) => AppError::Conflict(err.to_string()),
      StoreError::Database { source, .. } => AppError::Database { context, source },
    }
  }

  fn client_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::MalformedBody(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
      AppError::Timeout(_) => "Request to DB timed out".to_string(),
      AppError::Database { .. } => "Request to DB doesn't succeed".to_string(),
      AppError::Config(_) => "An internal error occurred".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
      AppError::Config(_) | AppError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Rejecting request");
    }
    HttpResponse::build(status).json(json!({ "error": self.client_message() }))
  }
}

/// Error handler for `web::JsonConfig`: bodies that fail to parse are 422.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::MalformedBody(format!("Failed to unmarshal body. {}", err)).into()
}

/// Error handler for `web::QueryConfig`: unparsable identifiers are 400.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Failed to parse query. {}", err)).into()
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;

  async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.error_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[test]
  fn store_errors_keep_their_kind() {
    assert!(matches!(
      AppError::from_store("goods_get", StoreError::NotFound("goods with id 4".into())),
      AppError::NotFound(m) if m == "goods with id 4 not found"
    ));
    assert!(matches!(
      AppError::from_store("goods_add", StoreError::AlreadyExists("goods with id 4".into())),
      AppError::Conflict(_)
    ));
    assert!(matches!(
      AppError::from_store(
        "order_create",
        StoreError::InsufficientStock { goods_id: 1, requested: 5, available: 2 }
      ),
      AppError::Conflict(m) if m.contains("requested 5")
    ));
    assert!(matches!(
      AppError::from_store("cart_add_goods", StoreError::OutOfRange("goods 1 in cart 2".into())),
      AppError::Conflict(m) if m == "Quantity or total of goods 1 in cart 2 is out of range"
    ));
    assert!(matches!(
      AppError::from_store("cart_delete", StoreError::Database { op: "cart_delete", source: sqlx::Error::PoolTimedOut }),
      AppError::Database { context: "cart_delete", .. }
    ));
  }

  #[actix_web::test]
  async fn database_details_stay_out_of_the_body() {
    let (status, body) = body_of(AppError::Database {
      context: "goods_get",
      source: sqlx::Error::PoolClosed,
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Request to DB doesn't succeed"}));
  }

  #[actix_web::test]
  async fn client_errors_carry_their_message() {
    let cases = [
      (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
      (AppError::MalformedBody("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
      (AppError::NotFound("bad".into()), StatusCode::NOT_FOUND),
      (AppError::Conflict("bad".into()), StatusCode::CONFLICT),
    ];
    for (err, expected) in cases {
      let (status, body) = body_of(err).await;
      assert_eq!(status, expected);
      assert_eq!(body, json!({"error": "bad"}));
    }
    let (status, _) = body_of(AppError::Timeout("goods_get")).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
  }
}
