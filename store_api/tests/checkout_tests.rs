// tests/checkout_tests.rs
mod common;
use common::*;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::{json, Value};
use store_api::models::Order;
use store_api::web::configure_app;

// Stocks pen (100) and notebook (3), then puts 4 pens and `notebooks` notebooks in cart 7.
macro_rules! seeded_app {
  ($notebooks:expr) => {{
    let app = test::init_service(App::new().configure(configure_app(memory_state()))).await;
    for goods in [pen(), notebook()] {
      let req = test::TestRequest::post().uri("/api/goods/add").set_json(goods).to_request();
      assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    }
    for (goods_id, quantity) in [(1, 4), (2, $notebooks)] {
      let req = test::TestRequest::put()
        .uri("/api/carts/goods/add?cart_id=7")
        .set_json(json!({"goods_id": goods_id, "quantity": quantity}))
        .to_request();
      assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    }
    app
  }};
}

macro_rules! stock_of {
  ($app:expr, $goods_id:expr) => {{
    let req = test::TestRequest::get()
      .uri(&format!("/api/goods/get?goods_id={}", $goods_id))
      .to_request();
    let goods: Value = test::call_and_read_body_json(&$app, req).await;
    goods["quantity"].as_i64().unwrap()
  }};
}

#[actix_web::test]
async fn checkout_decrements_stock_and_empties_the_cart() {
  let app = seeded_app!(2);

  let req = test::TestRequest::post()
    .uri("/api/orders/create")
    .set_json(json!({"cart_id": 7}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let order: Order = test::read_body_json(resp).await;
  assert_eq!(order.goods_id, 1);
  assert_eq!(order.quantity, 6);
  assert_eq!(order.total.to_string(), "14.50");
  assert!(order.order_time.unwrap() < order.finish_time);

  assert_eq!(stock_of!(app, 1), 96);
  assert_eq!(stock_of!(app, 2), 1);

  let req = test::TestRequest::get().uri("/api/carts/get?cart_id=7").to_request();
  let lines: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert!(lines.is_empty());

  let req = test::TestRequest::get()
    .uri(&format!("/api/orders/get?order_id={}", order.order_id))
    .to_request();
  let fetched: Order = test::call_and_read_body_json(&app, req).await;
  assert_eq!(fetched, order);
}

#[actix_web::test]
async fn checkout_with_insufficient_stock_changes_nothing() {
  let app = seeded_app!(5);

  let req = test::TestRequest::post()
    .uri("/api/orders/create")
    .set_json(json!({"cart_id": 7}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(
    body["error"],
    "Insufficient stock for goods 2: requested 5, available 3"
  );

  assert_eq!(stock_of!(app, 1), 100);
  assert_eq!(stock_of!(app, 2), 3);

  let req = test::TestRequest::get().uri("/api/carts/get?cart_id=7").to_request();
  let lines: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(lines.len(), 2);

  let req = test::TestRequest::get().uri("/api/orders/get?order_id=1").to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn checkout_of_an_empty_cart_is_not_found() {
  let app = test::init_service(App::new().configure(configure_app(memory_state()))).await;

  let req = test::TestRequest::post()
    .uri("/api/orders/create")
    .set_json(json!({"cart_id": 55}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({"error": "cart with id 55 not found"}));

  let req = test::TestRequest::post()
    .uri("/api/orders/create")
    .set_json(json!({}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Body validation failed. cart_id is a required field");
}

#[actix_web::test]
async fn orders_can_be_updated_and_deleted_once() {
  let app = seeded_app!(1);
  let req = test::TestRequest::post()
    .uri("/api/orders/create")
    .set_json(json!({"cart_id": 7}))
    .to_request();
  let order: Order = test::call_and_read_body_json(&app, req).await;
  let uri = |action: &str| format!("/api/orders/{}?order_id={}", action, order.order_id);

  let update = json!({
    "goods_id": 2,
    "quantity": 1,
    "total": "4.25",
    "finish_time": "2030-01-01T00:00:00Z"
  });
  let req = test::TestRequest::put().uri(&uri("update")).set_json(&update).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

  let req = test::TestRequest::get().uri(&uri("get")).to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["goods_id"], 2);
  assert_eq!(body["total"], "4.25");
  assert_eq!(body["order_time"], Value::Null);
  assert_eq!(body["finish_time"], "2030-01-01T00:00:00Z");

  let missing_finish = json!({"goods_id": 2, "quantity": 1, "total": "4.25"});
  let req = test::TestRequest::put().uri(&uri("update")).set_json(&missing_finish).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Body validation failed. finish_time is a required field");

  for expected in [StatusCode::NO_CONTENT, StatusCode::NOT_FOUND] {
    let req = test::TestRequest::delete().uri(&uri("delete")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), expected);
  }
}

#[actix_web::test]
async fn updating_a_missing_order_is_not_found() {
  let app = test::init_service(App::new().configure(configure_app(memory_state()))).await;
  let req = test::TestRequest::put()
    .uri("/api/orders/update?order_id=9")
    .set_json(json!({
      "goods_id": 1,
      "quantity": 1,
      "total": "1.50",
      "finish_time": "2030-01-01T00:00:00Z"
    }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
