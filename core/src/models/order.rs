// core/src/models/order.rs

use super::status::{OrderStatus, PaymentMethod, PaymentStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One shop's share of a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
  pub id: Uuid,
  pub order_number: String,
  pub user_id: Uuid,
  pub shop_id: Uuid,
  pub status: OrderStatus,
  pub total_amount_cents: i64,
  pub shipping_address: String,
  pub billing_address: String,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub tracking_number: Option<String>,
  pub shipping_company: Option<String>,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub listing_id: Uuid,
  pub quantity: i32,
  /// Unit price at checkout time.
  pub price_cents: i64,
  pub product_name: String,
  pub shop_name: String,
  pub created_at: DateTime<Utc>,
}

impl OrderItem {
  pub fn line_total_cents(&self) -> i64 {
    self.price_cents * i64::from(self.quantity)
  }
}

/// Append-only history entry; one per status or payment change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderStatusUpdate {
  pub id: Uuid,
  pub order_id: Uuid,
  pub status: OrderStatus,
  pub comment: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl OrderStatusUpdate {
  pub fn new(order_id: Uuid, status: OrderStatus, comment: Option<String>) -> Self {
    Self {
      id: Uuid::new_v4(),
      order_id,
      status,
      comment,
      created_at: Utc::now(),
    }
  }
}

/// An order with its items and status history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
  pub status_updates: Vec<OrderStatusUpdate>,
}

/// Order listing filter; `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
  pub user_id: Option<Uuid>,
  pub shop_id: Option<Uuid>,
  pub status: Option<OrderStatus>,
  pub skip: i64,
  pub limit: i64,
}
