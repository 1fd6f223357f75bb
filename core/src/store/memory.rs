// core/src/store/memory.rs

//! In-process store. A unit of work holds the store lock for its whole life
//! and edits a private copy of the data; `commit` writes the copy back.

use super::{CommerceStore, UnitOfWork};
use crate::models::{
  CartItem, CartLine, Order, OrderFilter, OrderItem, OrderStatus, OrderStatusUpdate, Shop, ShopListing, User,
};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex as SyncMutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
  pub users: HashMap<Uuid, User>,
  pub shops: HashMap<Uuid, Shop>,
  pub listings: HashMap<Uuid, ShopListing>,
  /// Insertion order is cart order.
  pub cart_items: Vec<CartItem>,
  pub orders: Vec<Order>,
  pub order_items: Vec<OrderItem>,
  pub status_updates: Vec<OrderStatusUpdate>,
}

/// Operations that can be made to fail on demand, for exercising rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
  InsertOrder,
  InsertOrderItem,
  AdjustStock,
  ClearCart,
  Commit,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
  state: Arc<Mutex<MemoryState>>,
  fail_points: Arc<SyncMutex<HashSet<FailPoint>>>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn add_user(&self, user: User) -> User {
    self.state.lock().await.users.insert(user.id, user.clone());
    user
  }

  pub async fn add_shop(&self, shop: Shop) -> Shop {
    self.state.lock().await.shops.insert(shop.id, shop.clone());
    shop
  }

  pub async fn add_listing(&self, listing: ShopListing) -> ShopListing {
    self.state.lock().await.listings.insert(listing.id, listing.clone());
    listing
  }

  pub async fn add_cart_item(&self, user_id: Uuid, listing_id: Uuid, quantity: i32) -> CartItem {
    let item = CartItem::new(user_id, listing_id, quantity);
    self.state.lock().await.cart_items.push(item.clone());
    item
  }

  /// A copy of the committed state.
  pub async fn snapshot(&self) -> MemoryState {
    self.state.lock().await.clone()
  }

  pub fn fail_on(&self, point: FailPoint) {
    self.fail_points.lock().insert(point);
  }

  pub fn clear_fail_points(&self) {
    self.fail_points.lock().clear();
  }
}

#[async_trait]
impl CommerceStore for InMemoryStore {
  async fn begin(&self) -> anyhow::Result<Box<dyn UnitOfWork>> {
    let guard = Arc::clone(&self.state).lock_owned().await;
    let working = guard.clone();
    Ok(Box::new(MemoryUnitOfWork {
      guard,
      working,
      fail_points: Arc::clone(&self.fail_points),
    }))
  }
}

struct MemoryUnitOfWork {
  guard: OwnedMutexGuard<MemoryState>,
  working: MemoryState,
  fail_points: Arc<SyncMutex<HashSet<FailPoint>>>,
}

impl MemoryUnitOfWork {
  fn check(&self, point: FailPoint) -> anyhow::Result<()> {
    if self.fail_points.lock().contains(&point) {
      bail!("injected failure at {:?}", point);
    }
    Ok(())
  }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
  async fn find_user(&mut self, user_id: Uuid) -> anyhow::Result<Option<User>> {
    Ok(self.working.users.get(&user_id).cloned())
  }

  async fn find_shop(&mut self, shop_id: Uuid) -> anyhow::Result<Option<Shop>> {
    Ok(self.working.shops.get(&shop_id).cloned())
  }

  async fn find_listing(&mut self, listing_id: Uuid) -> anyhow::Result<Option<ShopListing>> {
    Ok(self.working.listings.get(&listing_id).cloned())
  }

  async fn cart_lines(&mut self, user_id: Uuid) -> anyhow::Result<Vec<CartLine>> {
    let state = &self.working;
    state
      .cart_items
      .iter()
      .filter(|item| item.user_id == user_id)
      .map(|item| -> anyhow::Result<CartLine> {
        let listing = state
          .listings
          .get(&item.listing_id)
          .ok_or_else(|| anyhow!("cart item {} references missing listing {}", item.id, item.listing_id))?;
        let shop = state
          .shops
          .get(&listing.shop_id)
          .ok_or_else(|| anyhow!("listing {} references missing shop {}", listing.id, listing.shop_id))?;
        Ok(CartLine {
          cart_item_id: item.id,
          listing_id: listing.id,
          shop_id: shop.id,
          shop_name: shop.name.clone(),
          product_name: listing.name.clone(),
          unit_price_cents: listing.effective_price_cents(),
          quantity: item.quantity,
          stock_quantity: listing.stock_quantity,
          created_at: item.created_at,
        })
      })
      .collect()
  }

  async fn find_cart_item(&mut self, user_id: Uuid, item_id: Uuid) -> anyhow::Result<Option<CartItem>> {
    Ok(
      self
        .working
        .cart_items
        .iter()
        .find(|item| item.id == item_id && item.user_id == user_id)
        .cloned(),
    )
  }

  async fn find_cart_item_by_listing(&mut self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<Option<CartItem>> {
    Ok(
      self
        .working
        .cart_items
        .iter()
        .find(|item| item.listing_id == listing_id && item.user_id == user_id)
        .cloned(),
    )
  }

  async fn insert_cart_item(&mut self, item: &CartItem) -> anyhow::Result<()> {
    self.working.cart_items.push(item.clone());
    Ok(())
  }

  async fn update_cart_quantity(&mut self, item_id: Uuid, quantity: i32) -> anyhow::Result<Option<CartItem>> {
    let Some(item) = self.working.cart_items.iter_mut().find(|item| item.id == item_id) else {
      return Ok(None);
    };
    item.quantity = quantity;
    item.updated_at = Utc::now();
    Ok(Some(item.clone()))
  }

  async fn delete_cart_item(&mut self, user_id: Uuid, item_id: Uuid) -> anyhow::Result<bool> {
    let before = self.working.cart_items.len();
    self
      .working
      .cart_items
      .retain(|item| !(item.id == item_id && item.user_id == user_id));
    Ok(self.working.cart_items.len() < before)
  }

  async fn clear_cart(&mut self, user_id: Uuid) -> anyhow::Result<u64> {
    self.check(FailPoint::ClearCart)?;
    let before = self.working.cart_items.len();
    self.working.cart_items.retain(|item| item.user_id != user_id);
    Ok((before - self.working.cart_items.len()) as u64)
  }

  async fn adjust_stock(&mut self, listing_id: Uuid, delta: i32) -> anyhow::Result<Option<ShopListing>> {
    self.check(FailPoint::AdjustStock)?;
    let Some(listing) = self.working.listings.get_mut(&listing_id) else {
      return Ok(None);
    };
    listing.stock_quantity = listing.clamped_stock(delta);
    listing.updated_at = Utc::now();
    Ok(Some(listing.clone()))
  }

  async fn insert_order(&mut self, order: &Order) -> anyhow::Result<()> {
    self.check(FailPoint::InsertOrder)?;
    if self.working.orders.iter().any(|o| o.order_number == order.order_number) {
      bail!("duplicate order number {}", order.order_number);
    }
    self.working.orders.push(order.clone());
    Ok(())
  }

  async fn insert_order_item(&mut self, item: &OrderItem) -> anyhow::Result<()> {
    self.check(FailPoint::InsertOrderItem)?;
    self.working.order_items.push(item.clone());
    Ok(())
  }

  async fn insert_status_update(&mut self, update: &OrderStatusUpdate) -> anyhow::Result<()> {
    self.working.status_updates.push(update.clone());
    Ok(())
  }

  async fn find_order(&mut self, order_id: Uuid) -> anyhow::Result<Option<Order>> {
    Ok(self.working.orders.iter().find(|o| o.id == order_id).cloned())
  }

  async fn find_order_by_number(&mut self, order_number: &str) -> anyhow::Result<Option<Order>> {
    Ok(self.working.orders.iter().find(|o| o.order_number == order_number).cloned())
  }

  async fn order_items(&mut self, order_id: Uuid) -> anyhow::Result<Vec<OrderItem>> {
    Ok(
      self
        .working
        .order_items
        .iter()
        .filter(|item| item.order_id == order_id)
        .cloned()
        .collect(),
    )
  }

  async fn status_updates(&mut self, order_id: Uuid) -> anyhow::Result<Vec<OrderStatusUpdate>> {
    Ok(
      self
        .working
        .status_updates
        .iter()
        .filter(|update| update.order_id == order_id)
        .cloned()
        .collect(),
    )
  }

  async fn update_order(&mut self, order: &Order) -> anyhow::Result<()> {
    let stored = self
      .working
      .orders
      .iter_mut()
      .find(|o| o.id == order.id)
      .ok_or_else(|| anyhow!("order {} does not exist", order.id))?;
    stored.status = order.status;
    stored.payment_status = order.payment_status;
    stored.tracking_number = order.tracking_number.clone();
    stored.shipping_company = order.shipping_company.clone();
    stored.updated_at = order.updated_at;
    Ok(())
  }

  async fn list_orders(&mut self, filter: &OrderFilter) -> anyhow::Result<Vec<Order>> {
    let mut matching: Vec<Order> = self
      .working
      .orders
      .iter()
      .filter(|o| filter.user_id.map_or(true, |id| o.user_id == id))
      .filter(|o| filter.shop_id.map_or(true, |id| o.shop_id == id))
      .filter(|o| filter.status.map_or(true, |status| o.status == status))
      .cloned()
      .collect();
    // Stable sort keeps insertion order for orders created in the same instant.
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(
      matching
        .into_iter()
        .skip(filter.skip.max(0) as usize)
        .take(filter.limit.max(0) as usize)
        .collect(),
    )
  }

  async fn count_orders_by_status(&mut self, shop_id: Uuid) -> anyhow::Result<Vec<(OrderStatus, i64)>> {
    let mut counts: BTreeMap<OrderStatus, i64> = BTreeMap::new();
    for order in self.working.orders.iter().filter(|o| o.shop_id == shop_id) {
      *counts.entry(order.status).or_default() += 1;
    }
    Ok(counts.into_iter().collect())
  }

  async fn delivered_revenue(&mut self, shop_id: Uuid) -> anyhow::Result<i64> {
    Ok(
      self
        .working
        .orders
        .iter()
        .filter(|o| o.shop_id == shop_id && o.status == OrderStatus::Delivered)
        .map(|o| o.total_amount_cents)
        .sum(),
    )
  }

  async fn commit(self: Box<Self>) -> anyhow::Result<()> {
    self.check(FailPoint::Commit)?;
    let MemoryUnitOfWork { mut guard, working, .. } = *self;
    *guard = working;
    debug!("In-memory unit of work committed.");
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
    debug!("In-memory unit of work rolled back.");
    Ok(())
  }
}
