// core/src/error.rs

use crate::flow::FlowError;
use crate::models::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommerceError {
  #[error("Cart is empty")]
  EmptyCart,

  #[error("Invalid status transition from {from} to {to}")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Cannot cancel order with status {0}")]
  NotCancellable(OrderStatus),

  #[error("Insufficient stock for '{product_name}': requested {requested}, available {available}")]
  InsufficientStock {
    product_name: String,
    requested: i32,
    available: i32,
  },

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("No open unit of work")]
  NoUnitOfWork,

  #[error("Workflow '{0}' was halted before completion")]
  Halted(&'static str),

  #[error("Store error: {0}")]
  Store(#[from] anyhow::Error),

  #[error("Workflow error: {0}")]
  Flow(#[from] FlowError),
}

impl CommerceError {
  /// True for failures caused by the request rather than the system.
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      CommerceError::EmptyCart
        | CommerceError::InvalidTransition { .. }
        | CommerceError::NotCancellable(_)
        | CommerceError::InsufficientStock { .. }
        | CommerceError::Validation(_)
        | CommerceError::NotFound(_)
        | CommerceError::Forbidden(_)
    )
  }
}

pub type CommerceResult<T, E = CommerceError> = std::result::Result<T, E>;
