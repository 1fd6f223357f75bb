// core/src/models/status.rs

//! Order status, payment status and payment method enums, plus the single
//! transition table every caller checks against.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "order_status_enum", rename_all = "snake_case"))]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
  Returned,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
    OrderStatus::Returned,
  ];

  /// Statuses reachable from `self` in one transition.
  pub fn allowed_next(self) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match self {
      Pending => &[Processing, Cancelled],
      Processing => &[Shipped, Cancelled],
      Shipped => &[Delivered, Returned],
      Delivered => &[Returned],
      Cancelled | Returned => &[],
    }
  }

  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    self.allowed_next().contains(&next)
  }

  pub fn ensure_transition(self, next: OrderStatus) -> Result<(), CommerceError> {
    if self.can_transition_to(next) {
      Ok(())
    } else {
      Err(CommerceError::InvalidTransition { from: self, to: next })
    }
  }

  pub fn is_terminal(self) -> bool {
    self.allowed_next().is_empty()
  }

  /// A customer may cancel only before the order leaves the shop.
  pub fn is_cancellable(self) -> bool {
    self.can_transition_to(OrderStatus::Cancelled)
  }

  /// Recording tracking info moves these statuses straight to `Shipped`.
  pub fn ships_on_tracking(self) -> bool {
    matches!(self, OrderStatus::Pending | OrderStatus::Processing)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
      OrderStatus::Returned => "returned",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = CommerceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| CommerceError::Validation(format!("Unknown order status '{}'", s)))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "payment_status_enum", rename_all = "snake_case"))]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
  Refunded,
}

impl PaymentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Paid => "paid",
      PaymentStatus::Failed => "failed",
      PaymentStatus::Refunded => "refunded",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "payment_method_enum", rename_all = "snake_case"))]
pub enum PaymentMethod {
  CreditCard,
  BankTransfer,
  Reference,
  Multicaixa,
}

impl PaymentMethod {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentMethod::CreditCard => "credit_card",
      PaymentMethod::BankTransfer => "bank_transfer",
      PaymentMethod::Reference => "reference",
      PaymentMethod::Multicaixa => "multicaixa",
    }
  }
}

impl fmt::Display for PaymentMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn terminal_statuses_have_no_successors() {
    assert!(OrderStatus::Cancelled.is_terminal());
    assert!(OrderStatus::Returned.is_terminal());
    assert!(!OrderStatus::Delivered.is_terminal());
  }

  #[test]
  fn parses_wire_names() {
    assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
    assert!("lost".parse::<OrderStatus>().is_err());
  }

  #[test]
  fn cancellable_only_before_shipping() {
    assert!(OrderStatus::Pending.is_cancellable());
    assert!(OrderStatus::Processing.is_cancellable());
    assert!(!OrderStatus::Shipped.is_cancellable());
    assert_eq!(PaymentMethod::BankTransfer.to_string(), "bank_transfer");
  }
}
