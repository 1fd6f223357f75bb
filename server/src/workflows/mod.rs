// server/src/workflows/mod.rs

//! Registers the core workflows with the application registry.

use crate::errors::AppError;
use autoparts_core::cart::add_to_cart_workflow;
use autoparts_core::checkout::{checkout_workflow, CheckoutCtxData};
use autoparts_core::{CommerceError, ContextData, StepControl, Workflows};
use tracing::info;

/// Registers every workflow the HTTP handlers dispatch through `AppState::workflows`.
///
/// Called once at startup.
pub fn register_all_workflows(workflows: &Workflows<AppError>) {
  tracing::info!("Registering workflows...");

  let mut checkout = checkout_workflow();
  checkout.after_root("commit_unit_of_work", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let (user_id, order_numbers) = {
      let guard = ctx_data.read();
      let numbers: Vec<String> = guard.placed.iter().map(|d| d.order.order_number.clone()).collect();
      (guard.request.user_id, numbers)
    };
    info!(%user_id, orders = ?order_numbers, "Orders placed.");
    Ok::<_, CommerceError>(StepControl::Continue)
  });
  workflows.register(checkout);
  workflows.register(add_to_cart_workflow());

  tracing::info!("All application workflows registered.");
}

#[cfg(test)]
mod tests {
  use super::*;
  use autoparts_core::cart::AddToCartCtxData;

  #[test]
  fn registers_checkout_and_cart_workflows() {
    let workflows = Workflows::<AppError>::new();
    register_all_workflows(&workflows);
    assert!(workflows.is_registered::<CheckoutCtxData>());
    assert!(workflows.is_registered::<AddToCartCtxData>());
  }
}
