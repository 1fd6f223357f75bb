// core/src/checkout/mod.rs

//! Turns a user's cart into one order per shop inside a single unit of work.

mod grouping;
mod order_number;
mod workflow;

pub use grouping::{group_by_shop, ShopGroup};
pub use order_number::{generate_order_number, new_order_number};
pub use workflow::{checkout_workflow, CHECKOUT_WORKFLOW};

use crate::error::{CommerceError, CommerceResult};
use crate::flow::{ContextData, FlowOutcome};
use crate::models::{CartLine, OrderDetail, PaymentMethod};
use crate::store::{CommerceStore, TxSlot};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// What to do when a cart line asks for more than the listing holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
  /// Accept the order and clamp stock at zero.
  #[default]
  Clamp,
  /// Fail the checkout with `InsufficientStock`.
  Reject,
}

impl FromStr for StockPolicy {
  type Err = CommerceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "clamp" => Ok(StockPolicy::Clamp),
      "reject" => Ok(StockPolicy::Reject),
      other => Err(CommerceError::Validation(format!("Unknown stock policy '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
  pub user_id: Uuid,
  pub shipping_address: String,
  pub billing_address: String,
  pub payment_method: PaymentMethod,
  pub notes: Option<String>,
}

pub struct CheckoutCtxData {
  pub store: Arc<dyn CommerceStore>,
  pub tx: TxSlot,
  pub policy: StockPolicy,
  pub request: CheckoutRequest,
  pub cart: Vec<CartLine>,
  pub groups: Vec<ShopGroup>,
  pub placed: Vec<OrderDetail>,
}

impl CheckoutCtxData {
  pub fn new(store: Arc<dyn CommerceStore>, request: CheckoutRequest, policy: StockPolicy) -> Self {
    Self {
      store,
      tx: TxSlot::default(),
      policy,
      request,
      cart: Vec::new(),
      groups: Vec::new(),
      placed: Vec::new(),
    }
  }
}

/// Turns the outcome of a checkout run into the placed orders, rolling the
/// unit of work back when the run did not complete.
pub async fn settle_checkout<E>(
  ctx_data: &ContextData<CheckoutCtxData>,
  outcome: Result<FlowOutcome, E>,
) -> Result<Vec<OrderDetail>, E>
where
  E: From<CommerceError>,
{
  let tx = ctx_data.read().tx.clone();
  match outcome {
    Ok(FlowOutcome::Completed) => {
      let placed = std::mem::take(&mut ctx_data.write().placed);
      Ok(placed)
    }
    Ok(FlowOutcome::Stopped) => {
      tx.discard().await;
      Err(CommerceError::Halted(CHECKOUT_WORKFLOW).into())
    }
    Err(e) => {
      tx.discard().await;
      Err(e)
    }
  }
}

/// Runs the checkout workflow directly, without a registry.
#[instrument(name = "checkout::place_orders", skip(store, request), fields(user_id = %request.user_id))]
pub async fn place_orders(
  store: Arc<dyn CommerceStore>,
  request: CheckoutRequest,
  policy: StockPolicy,
) -> CommerceResult<Vec<OrderDetail>> {
  let workflow = checkout_workflow();
  let ctx_data = ContextData::new(CheckoutCtxData::new(store, request, policy));
  let outcome = workflow.run(ctx_data.clone()).await;
  settle_checkout(&ctx_data, outcome).await
}
