// core/src/orders/queries.rs

use super::{load_detail, load_order, OrderRef};
use crate::access::{ensure_shop_access, OrderScope, ShopAction};
use crate::error::{CommerceError, CommerceResult};
use crate::models::{OrderDetail, OrderFilter, OrderStatus, User};
use crate::store::{CommerceStore, UnitOfWork};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShopOrderSummary {
  pub total_orders: i64,
  pub pending_orders: i64,
  pub processing_orders: i64,
  pub shipped_orders: i64,
  pub delivered_orders: i64,
  pub cancelled_orders: i64,
  pub returned_orders: i64,
  /// Sum of delivered order totals.
  pub total_revenue_cents: i64,
}

async fn details_for(uow: &mut dyn UnitOfWork, filter: &OrderFilter) -> CommerceResult<Vec<OrderDetail>> {
  let orders = uow.list_orders(filter).await?;
  let mut details = Vec::with_capacity(orders.len());
  for order in orders {
    details.push(load_detail(uow, order).await?);
  }
  Ok(details)
}

async fn ensure_shop_exists(uow: &mut dyn UnitOfWork, shop_id: Uuid) -> CommerceResult<()> {
  match uow.find_shop(shop_id).await? {
    Some(_) => Ok(()),
    None => Err(CommerceError::NotFound("Shop not found".to_string())),
  }
}

#[instrument(name = "orders::get", skip(store))]
pub async fn get_order(store: &dyn CommerceStore, order_ref: &OrderRef, scope: OrderScope) -> CommerceResult<OrderDetail> {
  let mut uow = store.begin().await?;
  let order = load_order(uow.as_mut(), order_ref, scope).await?;
  let detail = load_detail(uow.as_mut(), order).await?;
  uow.rollback().await?;
  Ok(detail)
}

#[instrument(name = "orders::list_for_user", skip(store))]
pub async fn list_user_orders(
  store: &dyn CommerceStore,
  user_id: Uuid,
  status: Option<OrderStatus>,
  skip: i64,
  limit: i64,
) -> CommerceResult<Vec<OrderDetail>> {
  let filter = OrderFilter {
    user_id: Some(user_id),
    status,
    skip,
    limit,
    ..OrderFilter::default()
  };
  let mut uow = store.begin().await?;
  let details = details_for(uow.as_mut(), &filter).await?;
  uow.rollback().await?;
  Ok(details)
}

#[instrument(name = "orders::list_for_shop", skip(store, actor), fields(actor_id = %actor.id))]
pub async fn list_shop_orders(
  store: &dyn CommerceStore,
  actor: &User,
  shop_id: Uuid,
  status: Option<OrderStatus>,
  customer_id: Option<Uuid>,
  skip: i64,
  limit: i64,
) -> CommerceResult<Vec<OrderDetail>> {
  ensure_shop_access(actor, shop_id, ShopAction::View)?;
  let filter = OrderFilter {
    user_id: customer_id,
    shop_id: Some(shop_id),
    status,
    skip,
    limit,
  };
  let mut uow = store.begin().await?;
  ensure_shop_exists(uow.as_mut(), shop_id).await?;
  let details = details_for(uow.as_mut(), &filter).await?;
  uow.rollback().await?;
  Ok(details)
}

#[instrument(name = "orders::shop_summary", skip(store, actor), fields(actor_id = %actor.id))]
pub async fn shop_order_summary(store: &dyn CommerceStore, actor: &User, shop_id: Uuid) -> CommerceResult<ShopOrderSummary> {
  ensure_shop_access(actor, shop_id, ShopAction::View)?;
  let mut uow = store.begin().await?;
  ensure_shop_exists(uow.as_mut(), shop_id).await?;
  let counts = uow.count_orders_by_status(shop_id).await?;
  let total_revenue_cents = uow.delivered_revenue(shop_id).await?;
  uow.rollback().await?;

  let mut summary = ShopOrderSummary {
    total_revenue_cents,
    ..ShopOrderSummary::default()
  };
  for (status, count) in counts {
    summary.total_orders += count;
    let slot = match status {
      OrderStatus::Pending => &mut summary.pending_orders,
      OrderStatus::Processing => &mut summary.processing_orders,
      OrderStatus::Shipped => &mut summary.shipped_orders,
      OrderStatus::Delivered => &mut summary.delivered_orders,
      OrderStatus::Cancelled => &mut summary.cancelled_orders,
      OrderStatus::Returned => &mut summary.returned_orders,
    };
    *slot += count;
  }
  Ok(summary)
}
