// store_api/src/web/handlers/goods_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{Goods, GoodsUpdate};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct GoodsIdQuery {
  pub goods_id: Option<i64>,
}

#[instrument(name = "handler::add_goods", skip(app_state, payload), fields(goods_id = payload.goods_id))]
pub async fn add_goods_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<Goods>,
) -> Result<HttpResponse, AppError> {
  let goods = payload.into_inner();
  app_state.validator.check(&goods)?;

  app_state.store.goods_add(&goods).await?;
  info!("Goods {} added with stock {}.", goods.goods_id, goods.quantity);
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::get_goods", skip(app_state, query), fields(goods_id = ?query.goods_id))]
pub async fn get_goods_handler(
  app_state: web::Data<AppState>,
  query: web::Query<GoodsIdQuery>,
) -> Result<HttpResponse, AppError> {
  let goods_id = app_state.validator.check_id("goods_id", query.goods_id)?;

  let goods = app_state.store.goods_get(goods_id).await?;
  Ok(HttpResponse::Ok().json(goods))
}

#[instrument(name = "handler::update_goods", skip(app_state, query, payload), fields(goods_id = ?query.goods_id))]
pub async fn update_goods_handler(
  app_state: web::Data<AppState>,
  query: web::Query<GoodsIdQuery>,
  payload: web::Json<GoodsUpdate>,
) -> Result<HttpResponse, AppError> {
  let goods_id = app_state.validator.check_id("goods_id", query.goods_id)?;
  let update = payload.into_inner();
  app_state.validator.check(&update)?;

  app_state.store.goods_update(goods_id, &update).await?;
  info!("Goods {} updated.", goods_id);
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::delete_goods", skip(app_state, query), fields(goods_id = ?query.goods_id))]
pub async fn delete_goods_handler(
  app_state: web::Data<AppState>,
  query: web::Query<GoodsIdQuery>,
) -> Result<HttpResponse, AppError> {
  let goods_id = app_state.validator.check_id("goods_id", query.goods_id)?;

  app_state.store.goods_delete(goods_id).await?;
  info!("Goods {} deleted.", goods_id);
  Ok(HttpResponse::NoContent().finish())
}
