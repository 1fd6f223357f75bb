// core/src/checkout/workflow.rs

use super::grouping::group_by_shop;
use super::order_number::new_order_number;
use super::{CheckoutCtxData, StockPolicy};
use crate::error::{CommerceError, CommerceResult};
use crate::flow::{ContextData, SkipCondition, StepControl, Workflow};
use crate::models::{Order, OrderDetail, OrderItem, OrderStatus, OrderStatusUpdate, PaymentStatus};
use crate::store::active;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const CHECKOUT_WORKFLOW: &str = "checkout";

pub fn checkout_workflow() -> Workflow<CheckoutCtxData, CommerceError> {
  let clamping: SkipCondition<CheckoutCtxData> =
    Arc::new(|ctx_data: ContextData<CheckoutCtxData>| ctx_data.read().policy == StockPolicy::Clamp);

  let mut w = Workflow::<CheckoutCtxData, CommerceError>::new(
    CHECKOUT_WORKFLOW,
    &[
      ("validate_checkout_request", false, None),
      ("open_unit_of_work", false, None),
      ("load_cart", false, None),
      ("group_by_shop", false, None),
      ("verify_stock", false, Some(clamping)),
      ("persist_shop_orders", false, None),
      ("clear_cart", false, None),
      ("commit_unit_of_work", false, None),
    ],
  );

  w.on_root("validate_checkout_request", validate_checkout_request);
  w.on_root("open_unit_of_work", open_unit_of_work);
  w.on_root("load_cart", load_cart);
  w.on_root("group_by_shop", group_cart_by_shop);
  w.on_root("verify_stock", verify_stock);
  w.before_root("persist_shop_orders", assign_order_numbers);
  w.on_root("persist_shop_orders", persist_shop_orders);
  w.on_root("clear_cart", clear_cart);
  w.on_root("commit_unit_of_work", commit_unit_of_work);
  w
}

async fn validate_checkout_request(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let guard = ctx_data.read();
  if guard.request.shipping_address.trim().is_empty() {
    return Err(CommerceError::Validation("Shipping address is required".to_string()));
  }
  if guard.request.billing_address.trim().is_empty() {
    return Err(CommerceError::Validation("Billing address is required".to_string()));
  }
  Ok(StepControl::Continue)
}

async fn open_unit_of_work(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let (store, tx) = {
    let guard = ctx_data.read();
    (guard.store.clone(), guard.tx.clone())
  };
  tx.open(store.as_ref()).await?;
  Ok(StepControl::Continue)
}

async fn load_cart(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let (tx, user_id) = {
    let guard = ctx_data.read();
    (guard.tx.clone(), guard.request.user_id)
  };

  let lines = {
    let mut slot = tx.lock().await;
    active(&mut slot)?.cart_lines(user_id).await?
  };

  if lines.is_empty() {
    warn!(%user_id, "Checkout attempted with an empty cart.");
    return Err(CommerceError::EmptyCart);
  }

  debug!(%user_id, lines = lines.len(), "Cart loaded for checkout.");
  ctx_data.write().cart = lines;
  Ok(StepControl::Continue)
}

async fn group_cart_by_shop(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let mut guard = ctx_data.write();
  let groups = group_by_shop(&guard.cart);
  guard.groups = groups;
  info!(shops = guard.groups.len(), "Cart split by shop.");
  Ok(StepControl::Continue)
}

async fn verify_stock(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let guard = ctx_data.read();
  if let Some(line) = guard.cart.iter().find(|line| line.quantity > line.stock_quantity) {
    warn!(listing_id = %line.listing_id, requested = line.quantity, available = line.stock_quantity, "Insufficient stock.");
    return Err(CommerceError::InsufficientStock {
      product_name: line.product_name.clone(),
      requested: line.quantity,
      available: line.stock_quantity,
    });
  }
  Ok(StepControl::Continue)
}

/// Gives every group an order number unique within the batch and the store.
async fn assign_order_numbers(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let (tx, group_count) = {
    let guard = ctx_data.read();
    (guard.tx.clone(), guard.groups.len())
  };

  let mut numbers: Vec<String> = Vec::with_capacity(group_count);
  let mut taken: HashSet<String> = HashSet::new();
  {
    let mut slot = tx.lock().await;
    let uow = active(&mut slot)?;
    while numbers.len() < group_count {
      let candidate = new_order_number();
      if taken.contains(&candidate) || uow.find_order_by_number(&candidate).await?.is_some() {
        continue;
      }
      taken.insert(candidate.clone());
      numbers.push(candidate);
    }
  }

  let mut guard = ctx_data.write();
  for (group, number) in guard.groups.iter_mut().zip(numbers) {
    group.order_number = Some(number);
  }
  Ok(StepControl::Continue)
}

async fn persist_shop_orders(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let (tx, request, groups) = {
    let guard = ctx_data.read();
    (guard.tx.clone(), guard.request.clone(), guard.groups.clone())
  };

  let mut placed = Vec::with_capacity(groups.len());
  let mut slot = tx.lock().await;
  let uow = active(&mut slot)?;

  for group in groups {
    let order_number = group
      .order_number
      .clone()
      .ok_or_else(|| CommerceError::Validation(format!("Shop group {} has no order number", group.shop_id)))?;
    let now = Utc::now();
    let order = Order {
      id: Uuid::new_v4(),
      order_number,
      user_id: request.user_id,
      shop_id: group.shop_id,
      status: OrderStatus::Pending,
      total_amount_cents: group.total_amount_cents,
      shipping_address: request.shipping_address.clone(),
      billing_address: request.billing_address.clone(),
      payment_method: request.payment_method,
      payment_status: PaymentStatus::Pending,
      tracking_number: None,
      shipping_company: None,
      notes: request.notes.clone(),
      created_at: now,
      updated_at: now,
    };
    uow.insert_order(&order).await?;

    let mut items = Vec::with_capacity(group.lines.len());
    for line in &group.lines {
      let item = OrderItem {
        id: Uuid::new_v4(),
        order_id: order.id,
        listing_id: line.listing_id,
        quantity: line.quantity,
        price_cents: line.unit_price_cents,
        product_name: line.product_name.clone(),
        shop_name: group.shop_name.clone(),
        created_at: now,
      };
      uow.insert_order_item(&item).await?;

      uow
        .adjust_stock(line.listing_id, -line.quantity)
        .await?
        .ok_or_else(|| CommerceError::NotFound(format!("Listing {} no longer exists", line.listing_id)))?;
      items.push(item);
    }

    let created = OrderStatusUpdate::new(
      order.id,
      OrderStatus::Pending,
      Some(format!("Order created for shop {}", group.shop_name)),
    );
    uow.insert_status_update(&created).await?;

    info!(
      order_number = %order.order_number,
      shop_id = %order.shop_id,
      total_amount_cents = order.total_amount_cents,
      items = items.len(),
      "Shop order staged."
    );
    placed.push(OrderDetail {
      order,
      items,
      status_updates: vec![created],
    });
  }
  drop(slot);

  ctx_data.write().placed = placed;
  Ok(StepControl::Continue)
}

async fn clear_cart(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let (tx, user_id) = {
    let guard = ctx_data.read();
    (guard.tx.clone(), guard.request.user_id)
  };
  let removed = {
    let mut slot = tx.lock().await;
    active(&mut slot)?.clear_cart(user_id).await?
  };
  debug!(%user_id, removed, "Cart cleared.");
  Ok(StepControl::Continue)
}

async fn commit_unit_of_work(ctx_data: ContextData<CheckoutCtxData>) -> CommerceResult<StepControl> {
  let (tx, user_id, orders) = {
    let guard = ctx_data.read();
    (guard.tx.clone(), guard.request.user_id, guard.placed.len())
  };
  tx.commit().await?;
  info!(%user_id, orders, "Checkout committed.");
  Ok(StepControl::Continue)
}
