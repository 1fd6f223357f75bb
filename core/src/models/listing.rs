// core/src/models/listing.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shop's offer of a product: its price and the stock it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ShopListing {
  pub id: Uuid,
  pub shop_id: Uuid,
  pub name: String,
  pub sku: Option<String>,
  pub price_cents: i64,
  pub sale_price_cents: Option<i64>,
  pub stock_quantity: i32,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ShopListing {
  pub fn new(shop_id: Uuid, name: impl Into<String>, price_cents: i64, stock_quantity: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      shop_id,
      name: name.into(),
      sku: None,
      price_cents,
      sale_price_cents: None,
      stock_quantity,
      is_active: true,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn with_sale_price(mut self, sale_price_cents: i64) -> Self {
    self.sale_price_cents = Some(sale_price_cents);
    self
  }

  /// Sale price when one is set, list price otherwise.
  pub fn effective_price_cents(&self) -> i64 {
    self.sale_price_cents.unwrap_or(self.price_cents)
  }

  /// Stock after applying `delta`, never below zero.
  pub fn clamped_stock(&self, delta: i32) -> i32 {
    self.stock_quantity.saturating_add(delta).max(0)
  }
}
