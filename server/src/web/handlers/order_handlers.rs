// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use autoparts_core::access::{ensure_superuser, OrderScope};
use autoparts_core::checkout::{settle_checkout, CheckoutCtxData, CheckoutRequest};
use autoparts_core::models::{OrderDetail, OrderStatus, PaymentMethod};
use autoparts_core::orders::{self, OrderRef, OrderUpdate};
use autoparts_core::ContextData;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CreateOrdersPayload {
  pub shipping_address: String,
  pub billing_address: String,
  pub payment_method: PaymentMethod,
  pub notes: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CreateOrdersResponse {
  pub orders: Vec<OrderDetail>,
  pub total_orders: usize,
  pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct ListOrdersQuery {
  pub status: Option<OrderStatus>,
  pub skip: Option<i64>,
  pub limit: Option<i64>,
}

/// Checkout: one order per shop represented in the caller's cart.
#[instrument(name = "handler::create_orders", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn create_orders_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrdersPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let request = CheckoutRequest {
    user_id: auth_user.user.id,
    shipping_address: payload.shipping_address,
    billing_address: payload.billing_address,
    payment_method: payload.payment_method,
    notes: payload.notes,
  };
  let ctx_data = ContextData::new(CheckoutCtxData::new(
    app_state.store.clone(),
    request,
    app_state.config.stock_policy,
  ));

  let outcome = app_state.workflows.run(ctx_data.clone()).await;
  let placed = settle_checkout(&ctx_data, outcome).await?;

  let total_orders = placed.len();
  info!(total_orders, "Checkout completed.");
  Ok(HttpResponse::Created().json(CreateOrdersResponse {
    message: format!("Created {} order(s), one per shop", total_orders),
    total_orders,
    orders: placed,
  }))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListOrdersQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let (skip, limit) = app_state.config.page(query.skip, query.limit);
  let orders = orders::list_user_orders(app_state.store.as_ref(), auth_user.user.id, query.status, skip, limit).await?;
  Ok(HttpResponse::Ok().json(orders))
}

/// Accepts either the order UUID or its order number.
#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_ref = OrderRef::from(path.into_inner());
  let detail = orders::get_order(app_state.store.as_ref(), &order_ref, OrderScope::for_user(&auth_user.user)).await?;
  Ok(HttpResponse::Ok().json(detail))
}

#[instrument(name = "handler::cancel_order", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_ref = OrderRef::Id(path.into_inner());
  let detail = orders::cancel_order(app_state.store.as_ref(), &order_ref, OrderScope::for_user(&auth_user.user)).await?;
  Ok(HttpResponse::Ok().json(detail))
}

/// Superuser update of status, payment status and shipping info.
#[instrument(name = "handler::update_order", skip(app_state, auth_user, req_payload), fields(user_id = %auth_user.user.id))]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<OrderUpdate>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  ensure_superuser(&auth_user.user)?;
  let order_ref = OrderRef::Id(path.into_inner());
  let detail = orders::apply_order_update(app_state.store.as_ref(), &order_ref, req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(detail))
}
