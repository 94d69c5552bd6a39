// store_api/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{cart_handlers, goods_handlers, order_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/goods")
          .route("/add", web::post().to(goods_handlers::add_goods_handler))
          .route("/get", web::get().to(goods_handlers::get_goods_handler))
          .route("/update", web::put().to(goods_handlers::update_goods_handler))
          .route("/delete", web::delete().to(goods_handlers::delete_goods_handler)),
      )
      .service(
        web::scope("/carts")
          .route("/create", web::post().to(cart_handlers::create_cart_handler))
          .route("/get", web::get().to(cart_handlers::get_cart_handler))
          .route("/delete", web::delete().to(cart_handlers::delete_cart_handler))
          .route("/goods/add", web::put().to(cart_handlers::add_cart_goods_handler))
          .route("/goods/get", web::get().to(cart_handlers::list_cart_goods_handler))
          .route("/goods/update", web::put().to(cart_handlers::update_cart_goods_handler))
          .route("/goods/delete", web::delete().to(cart_handlers::delete_cart_goods_handler)),
      )
      .service(
        web::scope("/orders")
          .route("/create", web::post().to(order_handlers::create_order_handler))
          .route("/get", web::get().to(order_handlers::get_order_handler))
          .route("/update", web::put().to(order_handlers::update_order_handler))
          .route("/delete", web::delete().to(order_handlers::delete_order_handler)),
      ),
  );
}
