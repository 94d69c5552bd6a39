// store_api/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{CartGoodsAdd, CartGoodsUpdate, CartLine};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct CartIdQuery {
  pub cart_id: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct CartGoodsQuery {
  pub cart_id: Option<i64>,
  pub goods_id: Option<i64>,
}

#[instrument(
    name = "handler::create_cart",
    skip(app_state, payload),
    fields(cart_id = payload.cart_id, goods_id = payload.goods_id)
)]
pub async fn create_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CartLine>,
) -> Result<HttpResponse, AppError> {
  let line = payload.into_inner();
  app_state.validator.check(&line)?;

  app_state.store.cart_create(&line).await?;
  info!("Cart {} created with goods {}.", line.cart_id, line.goods_id);
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::get_cart", skip(app_state, query), fields(cart_id = ?query.cart_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartIdQuery>,
) -> Result<HttpResponse, AppError> {
  let cart_id = app_state.validator.check_id("cart_id", query.cart_id)?;

  let lines = app_state.store.cart_get_lines(cart_id).await?;
  Ok(HttpResponse::Ok().json(lines))
}

#[instrument(
    name = "handler::add_cart_goods",
    skip(app_state, query, payload),
    fields(cart_id = ?query.cart_id, goods_id = payload.goods_id, quantity = payload.quantity)
)]
pub async fn add_cart_goods_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartIdQuery>,
  payload: web::Json<CartGoodsAdd>,
) -> Result<HttpResponse, AppError> {
  let cart_id = app_state.validator.check_id("cart_id", query.cart_id)?;
  let item = payload.into_inner();
  app_state.validator.check(&item)?;

  app_state.store.cart_add_goods(cart_id, &item).await?;
  info!(
    "Added {} of goods {} to cart {}.",
    item.quantity, item.goods_id, cart_id
  );
  Ok(HttpResponse::NoContent().finish())
}

/// Goods referenced by cart lines; narrowed to one cart when `cart_id` is given.
#[instrument(name = "handler::list_cart_goods", skip(app_state, query), fields(cart_id = ?query.cart_id))]
pub async fn list_cart_goods_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartIdQuery>,
) -> Result<HttpResponse, AppError> {
  let cart_id = match query.cart_id {
    Some(raw) => Some(app_state.validator.check_id("cart_id", Some(raw))?),
    None => None,
  };

  let goods = app_state.store.cart_get_goods(cart_id).await?;
  info!("Fetched {} cart goods.", goods.len());
  Ok(HttpResponse::Ok().json(goods))
}

#[instrument(
    name = "handler::update_cart_goods",
    skip(app_state, query, payload),
    fields(cart_id = ?query.cart_id, goods_id = ?query.goods_id)
)]
pub async fn update_cart_goods_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartGoodsQuery>,
  payload: web::Json<CartGoodsUpdate>,
) -> Result<HttpResponse, AppError> {
  let cart_id = app_state.validator.check_id("cart_id", query.cart_id)?;
  let goods_id = app_state.validator.check_id("goods_id", query.goods_id)?;
  let update = payload.into_inner();
  app_state.validator.check(&update)?;

  app_state
    .store
    .cart_update_goods(cart_id, goods_id, update.quantity)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(
    name = "handler::delete_cart_goods",
    skip(app_state, query),
    fields(cart_id = ?query.cart_id, goods_id = ?query.goods_id)
)]
pub async fn delete_cart_goods_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartGoodsQuery>,
) -> Result<HttpResponse, AppError> {
  let cart_id = app_state.validator.check_id("cart_id", query.cart_id)?;
  let goods_id = app_state.validator.check_id("goods_id", query.goods_id)?;

  app_state.store.cart_delete_goods(cart_id, goods_id).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::delete_cart", skip(app_state, query), fields(cart_id = ?query.cart_id))]
pub async fn delete_cart_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartIdQuery>,
) -> Result<HttpResponse, AppError> {
  let cart_id = app_state.validator.check_id("cart_id", query.cart_id)?;

  app_state.store.cart_delete(cart_id).await?;
  info!("Cart {} deleted.", cart_id);
  Ok(HttpResponse::NoContent().finish())
}
