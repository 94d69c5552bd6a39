// store_api/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{OrderCreate, OrderUpdate, OrderUpdatePayload};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct OrderIdQuery {
  pub order_id: Option<i64>,
}

/// Checkout: converts the cart named in the body into an order.
#[instrument(name = "handler::create_order", skip(app_state, payload), fields(cart_id = payload.cart_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<OrderCreate>,
) -> Result<HttpResponse, AppError> {
  let request = payload.into_inner();
  app_state.validator.check(&request)?;

  info!("Checkout attempt for cart {}.", request.cart_id);
  match app_state.store.order_create(request.cart_id).await {
    Ok(order) => Ok(HttpResponse::Ok().json(order)),
    Err(err) => {
      warn!("Checkout of cart {} failed: {}", request.cart_id, err);
      Err(err)
    }
  }
}

#[instrument(name = "handler::get_order", skip(app_state, query), fields(order_id = ?query.order_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrderIdQuery>,
) -> Result<HttpResponse, AppError> {
  let order_id = app_state.validator.check_id("order_id", query.order_id)?;

  let order = app_state.store.order_get(order_id).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::update_order", skip(app_state, query, payload), fields(order_id = ?query.order_id))]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrderIdQuery>,
  payload: web::Json<OrderUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = app_state.validator.check_id("order_id", query.order_id)?;
  let update: OrderUpdate = app_state.validator.check_into(payload.into_inner())?;

  app_state.store.order_update(order_id, &update).await?;
  info!("Order {} updated.", order_id);
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::delete_order", skip(app_state, query), fields(order_id = ?query.order_id))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrderIdQuery>,
) -> Result<HttpResponse, AppError> {
  let order_id = app_state.validator.check_id("order_id", query.order_id)?;

  app_state.store.order_delete(order_id).await?;
  info!("Order {} deleted.", order_id);
  Ok(HttpResponse::NoContent().finish())
}
