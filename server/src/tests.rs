// server/src/tests.rs

//! HTTP-level tests over the in-memory store.

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, web as actix_data, App};
use autoparts_core::models::{Shop, ShopListing, User, UserRole};
use autoparts_core::store::InMemoryStore;
use autoparts_core::Workflows;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::configure_app_routes;
use crate::workflows::register_all_workflows;

struct Seed {
  memory: InMemoryStore,
  state: AppState,
  customer: User,
  admin: User,
  shop_one: Shop,
  shop_two: Shop,
  listing_a: ShopListing,
  listing_b: ShopListing,
}

async fn seed() -> Seed {
  let memory = InMemoryStore::new();
  let shop_one = memory.add_shop(Shop::new("Lisbon Brakes", "lisbon-brakes")).await;
  let shop_two = memory.add_shop(Shop::new("Luanda Filters", "luanda-filters")).await;
  let listing_a = memory.add_listing(ShopListing::new(shop_one.id, "Brake pad set", 1000, 10)).await;
  let listing_b = memory.add_listing(ShopListing::new(shop_two.id, "Oil filter", 500, 7)).await;
  let customer = memory.add_user(User::new("buyer@example.com", UserRole::Customer)).await;
  let admin = memory.add_user(User::new("admin@example.com", UserRole::Admin)).await;

  let workflows = Arc::new(Workflows::<AppError>::new());
  register_all_workflows(&workflows);
  let state = AppState {
    store: Arc::new(memory.clone()),
    workflows,
    config: Arc::new(AppConfig::for_tests()),
  };

  Seed {
    memory,
    state,
    customer,
    admin,
    shop_one,
    shop_two,
    listing_a,
    listing_b,
  }
}

macro_rules! init_app {
  ($seed:expr) => {
    test::init_service(
      App::new()
        .app_data(actix_data::Data::new($seed.state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

fn as_user(req: test::TestRequest, user: &User) -> test::TestRequest {
  req.insert_header(("X-User-ID", user.id.to_string()))
}

async fn body(resp: ServiceResponse) -> Value {
  test::read_body_json(resp).await
}

fn checkout_body() -> Value {
  json!({
    "shipping_address": "Rua Augusta 12, Lisboa",
    "billing_address": "Rua Augusta 12, Lisboa",
    "payment_method": "multicaixa"
  })
}

#[actix_web::test]
async fn health_check_responds_ok() {
  let seed = seed().await;
  let app = init_app!(seed);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body(resp).await, json!({"status": "ok"}));
}

#[actix_web::test]
async fn identity_header_is_required_and_must_name_a_user() {
  let seed = seed().await;
  let app = init_app!(seed);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/cart").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(body(resp).await, json!({"error": "Not authenticated"}));

  let req = test::TestRequest::get()
    .uri("/api/v1/cart")
    .insert_header(("X-User-ID", Uuid::new_v4().to_string()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn cart_then_checkout_creates_one_order_per_shop() {
  let seed = seed().await;
  let app = init_app!(seed);

  for (listing, quantity) in [(&seed.listing_a, 2), (&seed.listing_b, 3)] {
    let req = as_user(test::TestRequest::post().uri("/api/v1/cart"), &seed.customer)
      .set_json(json!({"product_id": listing.id, "quantity": quantity}))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  let req = as_user(test::TestRequest::get().uri("/api/v1/cart"), &seed.customer).to_request();
  let cart = body(test::call_service(&app, req).await).await;
  assert_eq!(cart["total_items"], 5);
  assert_eq!(cart["subtotal_cents"], 3500);

  let req = as_user(test::TestRequest::post().uri("/api/v1/orders"), &seed.customer)
    .set_json(checkout_body())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = body(resp).await;
  assert_eq!(created["total_orders"], 2);
  let totals: Vec<i64> = created["orders"]
    .as_array()
    .unwrap()
    .iter()
    .map(|o| o["total_amount_cents"].as_i64().unwrap())
    .collect();
  assert_eq!(totals, vec![2000, 1500]);
  assert_eq!(created["orders"][0]["status"], "pending");
  assert_eq!(created["orders"][0]["status_updates"].as_array().unwrap().len(), 1);

  let snapshot = seed.memory.snapshot().await;
  assert!(snapshot.cart_items.is_empty());
  assert_eq!(snapshot.listings[&seed.listing_a.id].stock_quantity, 8);
  assert_eq!(snapshot.listings[&seed.listing_b.id].stock_quantity, 4);

  let req = as_user(test::TestRequest::get().uri("/api/v1/orders?limit=1"), &seed.customer).to_request();
  let page = body(test::call_service(&app, req).await).await;
  assert_eq!(page.as_array().unwrap().len(), 1);

  let number = created["orders"][1]["order_number"].as_str().unwrap().to_string();
  let req = as_user(
    test::TestRequest::get().uri(&format!("/api/v1/orders/{}", number)),
    &seed.customer,
  )
  .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body(resp).await["shop_id"], json!(seed.shop_two.id));
}

#[actix_web::test]
async fn checkout_with_empty_cart_is_bad_request() {
  let seed = seed().await;
  let app = init_app!(seed);

  let req = as_user(test::TestRequest::post().uri("/api/v1/orders"), &seed.customer)
    .set_json(checkout_body())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(body(resp).await, json!({"error": "Cart is empty"}));
  assert!(seed.memory.snapshot().await.orders.is_empty());
}

#[actix_web::test]
async fn malformed_json_gets_json_error_body() {
  let seed = seed().await;
  let app = init_app!(seed);

  let req = as_user(test::TestRequest::post().uri("/api/v1/cart"), &seed.customer)
    .set_json(json!({"quantity": "many"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(body(resp).await["error"].is_string());
}

#[actix_web::test]
async fn shop_staff_drive_the_status_machine() {
  let seed = seed().await;
  seed.memory.add_cart_item(seed.customer.id, seed.listing_a.id, 2).await;
  seed.memory.add_cart_item(seed.customer.id, seed.listing_b.id, 3).await;
  let logist = seed
    .memory
    .add_user(User::new("logist@example.com", UserRole::Logist).with_shop(seed.shop_one.id))
    .await;
  let app = init_app!(seed);

  let req = as_user(test::TestRequest::post().uri("/api/v1/orders"), &seed.customer)
    .set_json(checkout_body())
    .to_request();
  let created = body(test::call_service(&app, req).await).await;
  let own_order = created["orders"][0]["id"].as_str().unwrap().to_string();
  let foreign_order = created["orders"][1]["id"].as_str().unwrap().to_string();
  let base = format!("/api/v1/shops/{}/orders", seed.shop_one.id);

  let req = as_user(test::TestRequest::put().uri(&format!("{}/{}/status", base, own_order)), &logist)
    .set_json(json!({"status": "delivered"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(
    body(resp).await["error"],
    "Invalid status transition from pending to delivered"
  );

  let req = as_user(test::TestRequest::put().uri(&format!("{}/{}/status", base, own_order)), &logist)
    .set_json(json!({"status": "processing", "comment": "Packed"}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = as_user(test::TestRequest::put().uri(&format!("{}/{}/shipping", base, own_order)), &logist)
    .set_json(json!({"tracking_number": "TRK-1", "shipping_company": "DHL"}))
    .to_request();
  let shipped = body(test::call_service(&app, req).await).await;
  assert_eq!(shipped["status"], "shipped");
  assert_eq!(shipped["tracking_number"], "TRK-1");

  let req = as_user(test::TestRequest::get().uri(&format!("{}/{}", base, foreign_order)), &logist).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(body(resp).await["error"], "Order not found in this shop");

  let req = as_user(
    test::TestRequest::get().uri(&format!("/api/v1/shops/{}/orders/summary", seed.shop_two.id)),
    &logist,
  )
  .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = as_user(test::TestRequest::get().uri(&format!("{}/summary", base)), &logist).to_request();
  let summary = body(test::call_service(&app, req).await).await;
  assert_eq!(summary["total_orders"], 1);
  assert_eq!(summary["shipped_orders"], 1);
}

#[actix_web::test]
async fn order_admin_update_and_customer_cancel() {
  let seed = seed().await;
  seed.memory.add_cart_item(seed.customer.id, seed.listing_a.id, 1).await;
  let app = init_app!(seed);

  let req = as_user(test::TestRequest::post().uri("/api/v1/orders"), &seed.customer)
    .set_json(checkout_body())
    .to_request();
  let created = body(test::call_service(&app, req).await).await;
  let order_id = created["orders"][0]["id"].as_str().unwrap().to_string();

  let req = as_user(test::TestRequest::put().uri(&format!("/api/v1/orders/{}", order_id)), &seed.customer)
    .set_json(json!({"status": "processing"}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = as_user(test::TestRequest::put().uri(&format!("/api/v1/orders/{}", order_id)), &seed.admin)
    .set_json(json!({"status": "processing", "payment_status": "paid", "notes": "Confirmed"}))
    .to_request();
  let updated = body(test::call_service(&app, req).await).await;
  assert_eq!(updated["status"], "processing");
  assert_eq!(updated["payment_status"], "paid");

  let req = as_user(
    test::TestRequest::put().uri(&format!("/api/v1/orders/{}/cancel", order_id)),
    &seed.customer,
  )
  .to_request();
  let cancelled = body(test::call_service(&app, req).await).await;
  assert_eq!(cancelled["status"], "cancelled");

  let req = as_user(
    test::TestRequest::put().uri(&format!("/api/v1/orders/{}/cancel", order_id)),
    &seed.customer,
  )
  .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(body(resp).await["error"], "Cannot cancel order with status cancelled");
}

#[actix_web::test]
async fn other_customers_cannot_read_an_order() {
  let seed = seed().await;
  let other = seed.memory.add_user(User::new("other@example.com", UserRole::Customer)).await;
  seed.memory.add_cart_item(seed.customer.id, seed.listing_a.id, 1).await;
  let app = init_app!(seed);

  let req = as_user(test::TestRequest::post().uri("/api/v1/orders"), &seed.customer)
    .set_json(checkout_body())
    .to_request();
  let created = body(test::call_service(&app, req).await).await;
  let number = created["orders"][0]["order_number"].as_str().unwrap().to_string();

  let req = as_user(test::TestRequest::get().uri(&format!("/api/v1/orders/{}", number)), &other).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  assert_eq!(body(resp).await, json!({"error": "Not enough permissions"}));

  let req = as_user(test::TestRequest::get().uri(&format!("/api/v1/orders/{}", number)), &seed.admin).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn stock_adjustment_is_clamped_and_guarded() {
  let seed = seed().await;
  let outsider = seed
    .memory
    .add_user(User::new("other@example.com", UserRole::Logist).with_shop(seed.shop_two.id))
    .await;
  let app = init_app!(seed);
  let uri = format!("/api/v1/shop-products/{}/stock", seed.listing_a.id);

  let req = as_user(test::TestRequest::put().uri(&uri), &outsider)
    .set_json(json!({"quantity_change": 5}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = as_user(test::TestRequest::put().uri(&uri), &seed.admin)
    .set_json(json!({"quantity_change": -25}))
    .to_request();
  let listing = body(test::call_service(&app, req).await).await;
  assert_eq!(listing["stock_quantity"], 0);

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/shop-products/{}", Uuid::new_v4()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(body(resp).await, json!({"error": "Shop product not found"}));
}
