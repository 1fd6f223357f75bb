// core/src/store/mod.rs

//! Persistence seam. A `CommerceStore` hands out units of work; everything
//! done through one unit is committed or discarded together.

pub mod memory;

use crate::error::{CommerceError, CommerceResult};
use crate::models::{
  CartItem, CartLine, Order, OrderFilter, OrderItem, OrderStatus, OrderStatusUpdate, Shop, ShopListing, User,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub use memory::InMemoryStore;

#[async_trait]
pub trait CommerceStore: Send + Sync {
  async fn begin(&self) -> anyhow::Result<Box<dyn UnitOfWork>>;
}

/// Operations available inside one transaction.
///
/// Dropping a unit without calling `commit` discards its writes.
#[async_trait]
pub trait UnitOfWork: Send {
  async fn find_user(&mut self, user_id: Uuid) -> anyhow::Result<Option<User>>;
  async fn find_shop(&mut self, shop_id: Uuid) -> anyhow::Result<Option<Shop>>;
  async fn find_listing(&mut self, listing_id: Uuid) -> anyhow::Result<Option<ShopListing>>;

  /// The user's cart joined with listings and shops, oldest item first.
  /// Listing rows stay locked until the unit ends.
  async fn cart_lines(&mut self, user_id: Uuid) -> anyhow::Result<Vec<CartLine>>;
  async fn find_cart_item(&mut self, user_id: Uuid, item_id: Uuid) -> anyhow::Result<Option<CartItem>>;
  async fn find_cart_item_by_listing(&mut self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<Option<CartItem>>;
  async fn insert_cart_item(&mut self, item: &CartItem) -> anyhow::Result<()>;
  async fn update_cart_quantity(&mut self, item_id: Uuid, quantity: i32) -> anyhow::Result<Option<CartItem>>;
  async fn delete_cart_item(&mut self, user_id: Uuid, item_id: Uuid) -> anyhow::Result<bool>;
  async fn clear_cart(&mut self, user_id: Uuid) -> anyhow::Result<u64>;

  /// Adds `delta` to the listing's stock, clamping at zero.
  async fn adjust_stock(&mut self, listing_id: Uuid, delta: i32) -> anyhow::Result<Option<ShopListing>>;

  async fn insert_order(&mut self, order: &Order) -> anyhow::Result<()>;
  async fn insert_order_item(&mut self, item: &OrderItem) -> anyhow::Result<()>;
  async fn insert_status_update(&mut self, update: &OrderStatusUpdate) -> anyhow::Result<()>;
  async fn find_order(&mut self, order_id: Uuid) -> anyhow::Result<Option<Order>>;
  async fn find_order_by_number(&mut self, order_number: &str) -> anyhow::Result<Option<Order>>;
  async fn order_items(&mut self, order_id: Uuid) -> anyhow::Result<Vec<OrderItem>>;
  async fn status_updates(&mut self, order_id: Uuid) -> anyhow::Result<Vec<OrderStatusUpdate>>;

  /// Persists the mutable fields of an order: status, payment status,
  /// tracking number, shipping company and `updated_at`.
  async fn update_order(&mut self, order: &Order) -> anyhow::Result<()>;

  /// Newest first.
  async fn list_orders(&mut self, filter: &OrderFilter) -> anyhow::Result<Vec<Order>>;
  async fn count_orders_by_status(&mut self, shop_id: Uuid) -> anyhow::Result<Vec<(OrderStatus, i64)>>;
  async fn delivered_revenue(&mut self, shop_id: Uuid) -> anyhow::Result<i64>;

  async fn commit(self: Box<Self>) -> anyhow::Result<()>;
  async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}

/// Holder for a unit of work shared by the steps of one workflow run.
///
/// Workflow state sits behind a blocking lock, so the unit lives behind an
/// async mutex of its own and can be used across `.await`.
#[derive(Clone, Default)]
pub struct TxSlot(Arc<Mutex<Option<Box<dyn UnitOfWork>>>>);

pub type TxGuard<'a> = MutexGuard<'a, Option<Box<dyn UnitOfWork>>>;

impl TxSlot {
  pub async fn open(&self, store: &dyn CommerceStore) -> CommerceResult<()> {
    let mut slot = self.0.lock().await;
    if let Some(stale) = slot.take() {
      stale.rollback().await?;
    }
    *slot = Some(store.begin().await?);
    Ok(())
  }

  pub async fn lock(&self) -> TxGuard<'_> {
    self.0.lock().await
  }

  pub async fn commit(&self) -> CommerceResult<()> {
    let uow = self.0.lock().await.take().ok_or(CommerceError::NoUnitOfWork)?;
    uow.commit().await?;
    Ok(())
  }

  /// Rolls back the open unit, if any.
  pub async fn rollback(&self) -> CommerceResult<()> {
    let uow = self.0.lock().await.take();
    if let Some(uow) = uow {
      uow.rollback().await?;
    }
    Ok(())
  }

  /// Rollback for error paths; a failed rollback is logged, not returned.
  pub async fn discard(&self) {
    if let Err(e) = self.rollback().await {
      tracing::warn!(error = %e, "Rolling back unit of work failed.");
    }
  }
}

/// The open unit behind a `TxGuard`.
pub fn active<'g>(guard: &'g mut TxGuard<'_>) -> CommerceResult<&'g mut Box<dyn UnitOfWork>> {
  guard.as_mut().ok_or(CommerceError::NoUnitOfWork)
}
