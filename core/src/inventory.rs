// core/src/inventory.rs

//! Shop listing stock.

use crate::access::{ensure_shop_access, ShopAction};
use crate::error::{CommerceError, CommerceResult};
use crate::models::{ShopListing, User};
use crate::store::CommerceStore;
use tracing::{info, instrument};
use uuid::Uuid;

fn listing_not_found() -> CommerceError {
  CommerceError::NotFound("Shop product not found".to_string())
}

#[instrument(name = "inventory::get_listing", skip(store))]
pub async fn get_listing(store: &dyn CommerceStore, listing_id: Uuid) -> CommerceResult<ShopListing> {
  let mut uow = store.begin().await?;
  let listing = uow.find_listing(listing_id).await?.ok_or_else(listing_not_found)?;
  uow.rollback().await?;
  Ok(listing)
}

/// Applies a signed stock delta, clamping at zero. Staff of the owning shop
/// and superusers only.
#[instrument(name = "inventory::adjust_stock", skip(store, actor), fields(actor_id = %actor.id))]
pub async fn adjust_stock(
  store: &dyn CommerceStore,
  actor: &User,
  listing_id: Uuid,
  quantity_change: i32,
) -> CommerceResult<ShopListing> {
  let mut uow = store.begin().await?;
  let listing = uow.find_listing(listing_id).await?.ok_or_else(listing_not_found)?;
  ensure_shop_access(actor, listing.shop_id, ShopAction::Update)?;

  let updated = uow
    .adjust_stock(listing_id, quantity_change)
    .await?
    .ok_or_else(listing_not_found)?;
  uow.commit().await?;

  info!(
    %listing_id,
    before = listing.stock_quantity,
    after = updated.stock_quantity,
    quantity_change,
    "Stock adjusted."
  );
  Ok(updated)
}
