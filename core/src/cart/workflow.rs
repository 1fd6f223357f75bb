// core/src/cart/workflow.rs

use super::AddToCartCtxData;
use crate::error::CommerceError;
use crate::flow::{ContextData, StepControl, Workflow};
use crate::models::CartItem;
use crate::store::active;
use tracing::{info, warn};

pub const ADD_TO_CART_WORKFLOW: &str = "add_to_cart";

pub fn add_to_cart_workflow() -> Workflow<AddToCartCtxData, CommerceError> {
  let mut w = Workflow::<AddToCartCtxData, CommerceError>::new(
    ADD_TO_CART_WORKFLOW,
    &[
      ("validate_cart_input", false, None),
      ("open_unit_of_work", false, None),
      ("fetch_listing_for_cart", false, None),
      ("upsert_cart_item", false, None),
      ("commit_unit_of_work", false, None),
    ],
  );

  w.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let quantity = ctx_data.read().quantity;
      if quantity < 1 {
        warn!(quantity, "Rejected cart quantity below one.");
        return Err(CommerceError::Validation("Quantity must be at least 1".to_string()));
      }
      Ok::<_, CommerceError>(StepControl::Continue)
    })
  });

  w.on_root("open_unit_of_work", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (store, tx) = {
        let guard = ctx_data.read();
        (guard.store.clone(), guard.tx.clone())
      };
      tx.open(store.as_ref()).await?;
      Ok::<_, CommerceError>(StepControl::Continue)
    })
  });

  w.on_root("fetch_listing_for_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (tx, listing_id) = {
        let guard = ctx_data.read();
        (guard.tx.clone(), guard.listing_id)
      };
      let listing = {
        let mut slot = tx.lock().await;
        active(&mut slot)?.find_listing(listing_id).await?
      };
      let listing = match listing {
        Some(listing) if listing.is_active => listing,
        Some(_) => return Err(CommerceError::Validation("Product is not available".to_string())),
        None => return Err(CommerceError::NotFound("Product not found".to_string())),
      };
      ctx_data.write().listing = Some(listing);
      Ok::<_, CommerceError>(StepControl::Continue)
    })
  });

  // Adding a listing already in the cart adds to its quantity.
  w.on_root("upsert_cart_item", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (tx, user_id, listing_id, quantity) = {
        let guard = ctx_data.read();
        (guard.tx.clone(), guard.user_id, guard.listing_id, guard.quantity)
      };
      let item = {
        let mut slot = tx.lock().await;
        let uow = active(&mut slot)?;
        match uow.find_cart_item_by_listing(user_id, listing_id).await? {
          Some(existing) => {
            let total = existing.quantity.saturating_add(quantity);
            uow
              .update_cart_quantity(existing.id, total)
              .await?
              .ok_or_else(|| CommerceError::NotFound("Item not found in cart".to_string()))?
          }
          None => {
            let item = CartItem::new(user_id, listing_id, quantity);
            uow.insert_cart_item(&item).await?;
            item
          }
        }
      };
      info!(%user_id, %listing_id, quantity = item.quantity, "Cart item saved.");
      ctx_data.write().cart_item = Some(item);
      Ok::<_, CommerceError>(StepControl::Continue)
    })
  });

  w.on_root("commit_unit_of_work", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let tx = ctx_data.read().tx.clone();
      tx.commit().await?;
      Ok::<_, CommerceError>(StepControl::Continue)
    })
  });

  w
}
