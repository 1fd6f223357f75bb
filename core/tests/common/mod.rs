// tests/common/mod.rs
#![allow(dead_code)]

use autoparts_core::checkout::CheckoutRequest;
use autoparts_core::models::{PaymentMethod, Shop, ShopListing, User, UserRole};
use autoparts_core::store::{CommerceStore, InMemoryStore};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Two shops, one listing each, and a customer whose cart holds
/// 2 x listing A (shop one, 10.00) and 3 x listing B (shop two, 5.00).
pub struct Fixture {
  pub memory: InMemoryStore,
  pub store: Arc<dyn CommerceStore>,
  pub customer: User,
  pub admin: User,
  pub shop_one: Shop,
  pub shop_two: Shop,
  pub listing_a: ShopListing,
  pub listing_b: ShopListing,
}

impl Fixture {
  pub async fn two_shop_cart() -> Self {
    let fixture = Self::empty_cart().await;
    fixture.memory.add_cart_item(fixture.customer.id, fixture.listing_a.id, 2).await;
    fixture.memory.add_cart_item(fixture.customer.id, fixture.listing_b.id, 3).await;
    fixture
  }

  pub async fn empty_cart() -> Self {
    let memory = InMemoryStore::new();
    let shop_one = memory.add_shop(Shop::new("Lisbon Brakes", "lisbon-brakes")).await;
    let shop_two = memory.add_shop(Shop::new("Luanda Filters", "luanda-filters")).await;
    let listing_a = memory.add_listing(ShopListing::new(shop_one.id, "Brake pad set", 1000, 10)).await;
    let listing_b = memory.add_listing(ShopListing::new(shop_two.id, "Oil filter", 500, 7)).await;
    let customer = memory.add_user(User::new("buyer@example.com", UserRole::Customer)).await;
    let admin = memory.add_user(User::new("admin@example.com", UserRole::Admin)).await;
    let store: Arc<dyn CommerceStore> = Arc::new(memory.clone());

    Self {
      memory,
      store,
      customer,
      admin,
      shop_one,
      shop_two,
      listing_a,
      listing_b,
    }
  }

  pub async fn logist_for(&self, shop_id: Uuid) -> User {
    self
      .memory
      .add_user(User::new(format!("logist-{}@example.com", shop_id.simple()), UserRole::Logist).with_shop(shop_id))
      .await
  }

  pub fn request(&self) -> CheckoutRequest {
    CheckoutRequest {
      user_id: self.customer.id,
      shipping_address: "Rua Augusta 12, Lisboa".to_string(),
      billing_address: "Rua Augusta 12, Lisboa".to_string(),
      payment_method: PaymentMethod::Multicaixa,
      notes: None,
    }
  }
}
