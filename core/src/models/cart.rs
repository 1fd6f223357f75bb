// core/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
  pub id: Uuid,
  pub user_id: Uuid,
  pub listing_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl CartItem {
  pub fn new(user_id: Uuid, listing_id: Uuid, quantity: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      listing_id,
      quantity,
      created_at: now,
      updated_at: now,
    }
  }
}

/// A cart item joined with its listing and the listing's shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
  pub cart_item_id: Uuid,
  pub listing_id: Uuid,
  pub shop_id: Uuid,
  pub shop_name: String,
  pub product_name: String,
  pub unit_price_cents: i64,
  pub quantity: i32,
  pub stock_quantity: i32,
  pub created_at: DateTime<Utc>,
}

impl CartLine {
  pub fn line_total_cents(&self) -> i64 {
    self.unit_price_cents * i64::from(self.quantity)
  }
}
