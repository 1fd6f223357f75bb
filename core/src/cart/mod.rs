// core/src/cart/mod.rs

//! Per-user cart: the add-to-cart workflow plus direct edits and the summary.

mod workflow;

pub use workflow::{add_to_cart_workflow, ADD_TO_CART_WORKFLOW};

use crate::error::{CommerceError, CommerceResult};
use crate::flow::{ContextData, FlowOutcome};
use crate::models::{CartItem, CartLine, ShopListing};
use crate::store::{CommerceStore, TxSlot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

pub struct AddToCartCtxData {
  pub store: Arc<dyn CommerceStore>,
  pub tx: TxSlot,
  pub user_id: Uuid,
  pub listing_id: Uuid,
  pub quantity: i32,
  pub listing: Option<ShopListing>,
  pub cart_item: Option<CartItem>,
}

impl AddToCartCtxData {
  pub fn new(store: Arc<dyn CommerceStore>, user_id: Uuid, listing_id: Uuid, quantity: i32) -> Self {
    Self {
      store,
      tx: TxSlot::default(),
      user_id,
      listing_id,
      quantity,
      listing: None,
      cart_item: None,
    }
  }
}

/// A cart item with the product data the client shows next to it.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
  pub id: Uuid,
  pub user_id: Uuid,
  pub listing_id: Uuid,
  pub quantity: i32,
  pub product_name: String,
  pub unit_price_cents: i64,
  pub line_total_cents: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl CartItemView {
  pub fn new(item: &CartItem, listing: &ShopListing) -> Self {
    let unit_price_cents = listing.effective_price_cents();
    Self {
      id: item.id,
      user_id: item.user_id,
      listing_id: item.listing_id,
      quantity: item.quantity,
      product_name: listing.name.clone(),
      unit_price_cents,
      line_total_cents: unit_price_cents * i64::from(item.quantity),
      created_at: item.created_at,
      updated_at: item.updated_at,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartSummaryLine {
  #[serde(flatten)]
  pub line: CartLine,
  pub line_total_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
  pub items: Vec<CartSummaryLine>,
  pub total_items: i64,
  pub subtotal_cents: i64,
}

impl CartSummary {
  pub fn from_lines(lines: Vec<CartLine>) -> Self {
    let total_items = lines.iter().map(|line| i64::from(line.quantity)).sum();
    let subtotal_cents = lines.iter().map(CartLine::line_total_cents).sum();
    let items = lines
      .into_iter()
      .map(|line| CartSummaryLine {
        line_total_cents: line.line_total_cents(),
        line,
      })
      .collect();
    Self {
      items,
      total_items,
      subtotal_cents,
    }
  }
}

/// Extracts the saved item from a finished add-to-cart run, rolling back
/// when the run did not complete.
pub async fn settle_add_to_cart<E>(
  ctx_data: &ContextData<AddToCartCtxData>,
  outcome: Result<FlowOutcome, E>,
) -> Result<CartItemView, E>
where
  E: From<CommerceError>,
{
  let tx = ctx_data.read().tx.clone();
  match outcome {
    Ok(FlowOutcome::Completed) => {
      let view = {
        let guard = ctx_data.read();
        match (&guard.cart_item, &guard.listing) {
          (Some(item), Some(listing)) => Some(CartItemView::new(item, listing)),
          _ => None,
        }
      };
      view.ok_or_else(|| CommerceError::Halted(ADD_TO_CART_WORKFLOW).into())
    }
    Ok(FlowOutcome::Stopped) => {
      tx.discard().await;
      Err(CommerceError::Halted(ADD_TO_CART_WORKFLOW).into())
    }
    Err(e) => {
      tx.discard().await;
      Err(e)
    }
  }
}

#[instrument(name = "cart::add_to_cart", skip(store))]
pub async fn add_to_cart(
  store: Arc<dyn CommerceStore>,
  user_id: Uuid,
  listing_id: Uuid,
  quantity: i32,
) -> CommerceResult<CartItemView> {
  let workflow = add_to_cart_workflow();
  let ctx_data = ContextData::new(AddToCartCtxData::new(store, user_id, listing_id, quantity));
  let outcome = workflow.run(ctx_data.clone()).await;
  settle_add_to_cart(&ctx_data, outcome).await
}

#[instrument(name = "cart::summary", skip(store))]
pub async fn cart_summary(store: &dyn CommerceStore, user_id: Uuid) -> CommerceResult<CartSummary> {
  let mut uow = store.begin().await?;
  let lines = uow.cart_lines(user_id).await?;
  uow.rollback().await?;
  Ok(CartSummary::from_lines(lines))
}

#[instrument(name = "cart::update_item", skip(store))]
pub async fn update_cart_item(
  store: &dyn CommerceStore,
  user_id: Uuid,
  item_id: Uuid,
  quantity: i32,
) -> CommerceResult<CartItemView> {
  if quantity < 1 {
    return Err(CommerceError::Validation("Quantity must be at least 1".to_string()));
  }
  let mut uow = store.begin().await?;
  if uow.find_cart_item(user_id, item_id).await?.is_none() {
    return Err(CommerceError::NotFound("Item not found in cart".to_string()));
  }
  let item = uow
    .update_cart_quantity(item_id, quantity)
    .await?
    .ok_or_else(|| CommerceError::NotFound("Item not found in cart".to_string()))?;
  let listing = uow
    .find_listing(item.listing_id)
    .await?
    .ok_or_else(|| CommerceError::NotFound("Product not found".to_string()))?;
  uow.commit().await?;
  Ok(CartItemView::new(&item, &listing))
}

#[instrument(name = "cart::remove_item", skip(store))]
pub async fn remove_cart_item(store: &dyn CommerceStore, user_id: Uuid, item_id: Uuid) -> CommerceResult<()> {
  let mut uow = store.begin().await?;
  if !uow.delete_cart_item(user_id, item_id).await? {
    return Err(CommerceError::NotFound("Item not found in cart".to_string()));
  }
  uow.commit().await?;
  Ok(())
}

#[instrument(name = "cart::clear", skip(store))]
pub async fn clear_cart(store: &dyn CommerceStore, user_id: Uuid) -> CommerceResult<u64> {
  let mut uow = store.begin().await?;
  let removed = uow.clear_cart(user_id).await?;
  uow.commit().await?;
  Ok(removed)
}
