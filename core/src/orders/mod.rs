// core/src/orders/mod.rs

//! Order lookup, lifecycle changes and shop-level queries.

mod lifecycle;
mod queries;

pub use lifecycle::{
  apply_order_update, cancel_order, transition_status, update_order_status, update_payment_status,
  update_shipping_info, OrderUpdate,
};
pub use queries::{get_order, list_shop_orders, list_user_orders, shop_order_summary, ShopOrderSummary};

use crate::access::OrderScope;
use crate::error::{CommerceError, CommerceResult};
use crate::models::{Order, OrderDetail};
use crate::store::UnitOfWork;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// An order addressed by UUID or by its order number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
  Id(Uuid),
  Number(String),
}

impl FromStr for OrderRef {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(OrderRef::from(s.to_string()))
  }
}

impl From<String> for OrderRef {
  fn from(s: String) -> Self {
    match Uuid::parse_str(&s) {
      Ok(id) => OrderRef::Id(id),
      Err(_) => OrderRef::Number(s),
    }
  }
}

impl From<Uuid> for OrderRef {
  fn from(id: Uuid) -> Self {
    OrderRef::Id(id)
  }
}

impl fmt::Display for OrderRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OrderRef::Id(id) => write!(f, "{}", id),
      OrderRef::Number(number) => f.write_str(number),
    }
  }
}

/// Loads an order and checks it falls inside `scope`.
pub(crate) async fn load_order(
  uow: &mut dyn UnitOfWork,
  order_ref: &OrderRef,
  scope: OrderScope,
) -> CommerceResult<Order> {
  let order = match order_ref {
    OrderRef::Id(id) => uow.find_order(*id).await?,
    OrderRef::Number(number) => uow.find_order_by_number(number).await?,
  }
  .ok_or_else(|| CommerceError::NotFound("Order not found".to_string()))?;
  scope.check(&order)?;
  Ok(order)
}

pub(crate) async fn load_detail(uow: &mut dyn UnitOfWork, order: Order) -> CommerceResult<OrderDetail> {
  let items = uow.order_items(order.id).await?;
  let status_updates = uow.status_updates(order.id).await?;
  Ok(OrderDetail {
    order,
    items,
    status_updates,
  })
}
