// tests/shop_operations_tests.rs
mod common;

use autoparts_core::access::OrderScope;
use autoparts_core::checkout::{place_orders, StockPolicy};
use autoparts_core::inventory::{adjust_stock, get_listing};
use autoparts_core::models::{OrderStatus, ShopListing};
use autoparts_core::orders::{list_shop_orders, list_user_orders, shop_order_summary, update_order_status, OrderRef};
use autoparts_core::CommerceError;
use common::*;
use serial_test::serial;
use uuid::Uuid;

#[test]
fn test_clamped_stock_never_goes_negative() {
  let listing = ShopListing::new(Uuid::new_v4(), "Wiper blade", 900, 3);
  assert_eq!(listing.clamped_stock(-2), 1);
  assert_eq!(listing.clamped_stock(-5), 0);
  assert_eq!(listing.clamped_stock(4), 7);
  assert_eq!(listing.clamped_stock(i32::MAX), i32::MAX);
}

#[tokio::test]
#[serial]
async fn test_staff_adjust_stock_with_clamp() {
  setup_tracing();
  let fx = Fixture::empty_cart().await;
  let logist = fx.logist_for(fx.shop_one.id).await;

  let restocked = adjust_stock(fx.store.as_ref(), &logist, fx.listing_a.id, 5).await.unwrap();
  assert_eq!(restocked.stock_quantity, 15);

  let drained = adjust_stock(fx.store.as_ref(), &fx.admin, fx.listing_a.id, -40).await.unwrap();
  assert_eq!(drained.stock_quantity, 0);
  assert_eq!(get_listing(fx.store.as_ref(), fx.listing_a.id).await.unwrap().stock_quantity, 0);
}

#[tokio::test]
#[serial]
async fn test_stock_adjustment_access_and_missing_listing() {
  setup_tracing();
  let fx = Fixture::empty_cart().await;
  let other_logist = fx.logist_for(fx.shop_two.id).await;

  let err = adjust_stock(fx.store.as_ref(), &other_logist, fx.listing_a.id, 1).await.unwrap_err();
  assert!(matches!(err, CommerceError::Forbidden(_)));

  let err = adjust_stock(fx.store.as_ref(), &fx.customer, fx.listing_a.id, 1).await.unwrap_err();
  assert!(matches!(err, CommerceError::Forbidden(_)));

  let err = adjust_stock(fx.store.as_ref(), &fx.admin, Uuid::new_v4(), 1).await.unwrap_err();
  assert_eq!(err.to_string(), "Shop product not found");
  assert_eq!(fx.memory.snapshot().await.listings[&fx.listing_a.id].stock_quantity, 10);
}

#[tokio::test]
#[serial]
async fn test_shop_order_listing_and_summary() {
  setup_tracing();
  let fx = Fixture::two_shop_cart().await;
  let placed = place_orders(fx.store.clone(), fx.request(), StockPolicy::Clamp).await.unwrap();
  let shop_one_order = OrderRef::Id(placed[0].order.id);
  for next in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
    update_order_status(fx.store.as_ref(), &shop_one_order, OrderScope::Shop(fx.shop_one.id), next, None)
      .await
      .unwrap();
  }
  fx.memory.add_cart_item(fx.customer.id, fx.listing_a.id, 1).await;
  place_orders(fx.store.clone(), fx.request(), StockPolicy::Clamp).await.unwrap();

  let logist = fx.logist_for(fx.shop_one.id).await;
  let orders = list_shop_orders(fx.store.as_ref(), &logist, fx.shop_one.id, None, None, 0, 100)
    .await
    .unwrap();
  assert_eq!(orders.len(), 2);
  assert!(orders.iter().all(|d| d.order.shop_id == fx.shop_one.id));

  let pending = list_shop_orders(
    fx.store.as_ref(),
    &logist,
    fx.shop_one.id,
    Some(OrderStatus::Pending),
    Some(fx.customer.id),
    0,
    100,
  )
  .await
  .unwrap();
  assert_eq!(pending.len(), 1);

  let summary = shop_order_summary(fx.store.as_ref(), &logist, fx.shop_one.id).await.unwrap();
  assert_eq!(summary.total_orders, 2);
  assert_eq!(summary.delivered_orders, 1);
  assert_eq!(summary.pending_orders, 1);
  assert_eq!(summary.total_revenue_cents, 2000);

  let err = shop_order_summary(fx.store.as_ref(), &logist, fx.shop_two.id).await.unwrap_err();
  assert_eq!(err.to_string(), "Not authorized to access this shop's orders");

  let err = list_shop_orders(fx.store.as_ref(), &fx.admin, Uuid::new_v4(), None, None, 0, 10)
    .await
    .unwrap_err();
  assert_eq!(err.to_string(), "Shop not found");

  let mine = list_user_orders(fx.store.as_ref(), fx.customer.id, None, 0, 2).await.unwrap();
  assert_eq!(mine.len(), 2);
  let paged = list_user_orders(fx.store.as_ref(), fx.customer.id, None, 2, 10).await.unwrap();
  assert_eq!(paged.len(), 1);
}
