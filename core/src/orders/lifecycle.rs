// core/src/orders/lifecycle.rs

use super::{load_detail, load_order, OrderRef};
use crate::access::OrderScope;
use crate::error::{CommerceError, CommerceResult};
use crate::models::{Order, OrderDetail, OrderStatus, OrderStatusUpdate, PaymentStatus};
use crate::store::{CommerceStore, UnitOfWork};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};

/// Superuser edit of an order. Fields left `None` are untouched; shipping
/// info applies only when both halves are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderUpdate {
  pub status: Option<OrderStatus>,
  pub payment_status: Option<PaymentStatus>,
  pub tracking_number: Option<String>,
  pub shipping_company: Option<String>,
  /// Comment for the status change.
  pub notes: Option<String>,
}

/// Moves `order` to `next` if the transition table allows it and appends
/// the matching status update.
pub async fn transition_status(
  uow: &mut dyn UnitOfWork,
  order: &mut Order,
  next: OrderStatus,
  comment: Option<String>,
) -> CommerceResult<OrderStatusUpdate> {
  order.status.ensure_transition(next)?;
  record_status(uow, order, next, comment).await
}

async fn record_status(
  uow: &mut dyn UnitOfWork,
  order: &mut Order,
  status: OrderStatus,
  comment: Option<String>,
) -> CommerceResult<OrderStatusUpdate> {
  let from = order.status;
  order.status = status;
  order.updated_at = Utc::now();
  uow.update_order(order).await?;

  let update = OrderStatusUpdate::new(order.id, status, comment);
  uow.insert_status_update(&update).await?;
  info!(order_number = %order.order_number, %from, to = %status, "Order status changed.");
  Ok(update)
}

async fn record_payment_status(
  uow: &mut dyn UnitOfWork,
  order: &mut Order,
  payment_status: PaymentStatus,
) -> CommerceResult<OrderStatusUpdate> {
  order.payment_status = payment_status;
  order.updated_at = Utc::now();
  uow.update_order(order).await?;

  let update = OrderStatusUpdate::new(
    order.id,
    order.status,
    Some(format!("Payment status updated to {}", payment_status)),
  );
  uow.insert_status_update(&update).await?;
  Ok(update)
}

async fn record_shipping(
  uow: &mut dyn UnitOfWork,
  order: &mut Order,
  tracking_number: &str,
  shipping_company: &str,
) -> CommerceResult<()> {
  let (tracking_number, shipping_company) = (tracking_number.trim(), shipping_company.trim());
  if tracking_number.is_empty() || shipping_company.is_empty() {
    return Err(CommerceError::Validation(
      "Tracking number and shipping company are required".to_string(),
    ));
  }

  order.tracking_number = Some(tracking_number.to_string());
  order.shipping_company = Some(shipping_company.to_string());

  if order.status.ships_on_tracking() {
    let comment = format!("Order shipped via {}, tracking: {}", shipping_company, tracking_number);
    record_status(uow, order, OrderStatus::Shipped, Some(comment)).await?;
  } else {
    order.updated_at = Utc::now();
    uow.update_order(order).await?;
  }
  Ok(())
}

#[instrument(name = "orders::update_status", skip(store, comment))]
pub async fn update_order_status(
  store: &dyn CommerceStore,
  order_ref: &OrderRef,
  scope: OrderScope,
  next: OrderStatus,
  comment: Option<String>,
) -> CommerceResult<OrderDetail> {
  let mut uow = store.begin().await?;
  let mut order = load_order(uow.as_mut(), order_ref, scope).await?;
  transition_status(uow.as_mut(), &mut order, next, comment).await?;
  let detail = load_detail(uow.as_mut(), order).await?;
  uow.commit().await?;
  Ok(detail)
}

#[instrument(name = "orders::update_payment_status", skip(store))]
pub async fn update_payment_status(
  store: &dyn CommerceStore,
  order_ref: &OrderRef,
  scope: OrderScope,
  payment_status: PaymentStatus,
) -> CommerceResult<OrderDetail> {
  let mut uow = store.begin().await?;
  let mut order = load_order(uow.as_mut(), order_ref, scope).await?;
  record_payment_status(uow.as_mut(), &mut order, payment_status).await?;
  let detail = load_detail(uow.as_mut(), order).await?;
  uow.commit().await?;
  Ok(detail)
}

#[instrument(name = "orders::update_shipping_info", skip(store))]
pub async fn update_shipping_info(
  store: &dyn CommerceStore,
  order_ref: &OrderRef,
  scope: OrderScope,
  tracking_number: &str,
  shipping_company: &str,
) -> CommerceResult<OrderDetail> {
  let mut uow = store.begin().await?;
  let mut order = load_order(uow.as_mut(), order_ref, scope).await?;
  record_shipping(uow.as_mut(), &mut order, tracking_number, shipping_company).await?;
  let detail = load_detail(uow.as_mut(), order).await?;
  uow.commit().await?;
  Ok(detail)
}

/// Customer cancellation; allowed while the order is pending or processing.
#[instrument(name = "orders::cancel", skip(store))]
pub async fn cancel_order(
  store: &dyn CommerceStore,
  order_ref: &OrderRef,
  scope: OrderScope,
) -> CommerceResult<OrderDetail> {
  let mut uow = store.begin().await?;
  let mut order = load_order(uow.as_mut(), order_ref, scope).await?;
  if !order.status.is_cancellable() {
    return Err(CommerceError::NotCancellable(order.status));
  }
  transition_status(
    uow.as_mut(),
    &mut order,
    OrderStatus::Cancelled,
    Some("Cancelled by user".to_string()),
  )
  .await?;
  let detail = load_detail(uow.as_mut(), order).await?;
  uow.commit().await?;
  Ok(detail)
}

/// Applies status, then payment status, then shipping info, all in one unit.
#[instrument(name = "orders::apply_update", skip(store, update))]
pub async fn apply_order_update(
  store: &dyn CommerceStore,
  order_ref: &OrderRef,
  update: OrderUpdate,
) -> CommerceResult<OrderDetail> {
  let mut uow = store.begin().await?;
  let mut order = load_order(uow.as_mut(), order_ref, OrderScope::Any).await?;

  if let Some(next) = update.status {
    transition_status(uow.as_mut(), &mut order, next, update.notes.clone()).await?;
  }
  if let Some(payment_status) = update.payment_status {
    record_payment_status(uow.as_mut(), &mut order, payment_status).await?;
  }
  if let (Some(tracking_number), Some(shipping_company)) = (&update.tracking_number, &update.shipping_company) {
    record_shipping(uow.as_mut(), &mut order, tracking_number, shipping_company).await?;
  }

  let detail = load_detail(uow.as_mut(), order).await?;
  uow.commit().await?;
  Ok(detail)
}
