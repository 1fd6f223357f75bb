// core/src/access.rs

//! Who may see or change what.

use crate::error::{CommerceError, CommerceResult};
use crate::models::{Order, User, UserRole};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopAction {
  View,
  Update,
}

/// Admins reach every shop, a logist only their own, customers none.
pub fn can_access_shop(user: &User, shop_id: Uuid) -> bool {
  match user.role {
    UserRole::Superadmin | UserRole::Admin => true,
    UserRole::Logist => user.shop_id == Some(shop_id),
    UserRole::Customer => false,
  }
}

pub fn ensure_shop_access(user: &User, shop_id: Uuid, action: ShopAction) -> CommerceResult<()> {
  if can_access_shop(user, shop_id) {
    return Ok(());
  }
  let verb = match action {
    ShopAction::View => "access",
    ShopAction::Update => "update",
  };
  Err(CommerceError::Forbidden(format!("Not authorized to {} this shop's orders", verb)))
}

pub fn ensure_superuser(user: &User) -> CommerceResult<()> {
  if user.is_superuser() {
    Ok(())
  } else {
    Err(CommerceError::Forbidden("Not enough permissions".to_string()))
  }
}

/// The set of orders a caller may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
  Any,
  /// Orders owned by this customer.
  Customer(Uuid),
  /// Orders placed with this shop.
  Shop(Uuid),
}

impl OrderScope {
  /// Superusers see every order, anyone else only their own.
  pub fn for_user(user: &User) -> Self {
    if user.is_superuser() {
      OrderScope::Any
    } else {
      OrderScope::Customer(user.id)
    }
  }

  pub fn check(&self, order: &Order) -> CommerceResult<()> {
    match *self {
      OrderScope::Any => Ok(()),
      OrderScope::Customer(user_id) if order.user_id == user_id => Ok(()),
      OrderScope::Customer(_) => Err(CommerceError::Forbidden("Not enough permissions".to_string())),
      OrderScope::Shop(shop_id) if order.shop_id == shop_id => Ok(()),
      OrderScope::Shop(_) => Err(CommerceError::NotFound("Order not found in this shop".to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn logist_reaches_only_assigned_shop() {
    let (own, other) = (Uuid::new_v4(), Uuid::new_v4());
    let logist = User::new("logist@shop.test", UserRole::Logist).with_shop(own);

    assert!(can_access_shop(&logist, own));
    assert!(!can_access_shop(&logist, other));
    assert!(matches!(
      ensure_shop_access(&logist, other, ShopAction::Update),
      Err(CommerceError::Forbidden(msg)) if msg == "Not authorized to update this shop's orders"
    ));
  }

  #[test]
  fn admins_reach_every_shop_and_customers_none() {
    let shop = Uuid::new_v4();
    assert!(can_access_shop(&User::new("a@x.test", UserRole::Admin), shop));
    assert!(can_access_shop(&User::new("s@x.test", UserRole::Superadmin), shop));
    assert!(!can_access_shop(&User::new("c@x.test", UserRole::Customer), shop));
  }
}
