// server/src/web/handlers/shop_order_handlers.rs

//! Order management for shop staff. Every route checks the caller may reach
//! the shop before touching its orders.

use actix_web::{web, HttpResponse};
use autoparts_core::access::{ensure_shop_access, OrderScope, ShopAction};
use autoparts_core::models::{OrderStatus, PaymentStatus};
use autoparts_core::orders::{self, OrderRef};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct ShopOrdersQuery {
  pub status: Option<OrderStatus>,
  pub customer_id: Option<Uuid>,
  pub skip: Option<i64>,
  pub limit: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct StatusPayload {
  pub status: OrderStatus,
  pub comment: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PaymentPayload {
  pub payment_status: PaymentStatus,
}

#[derive(Deserialize, Debug)]
pub struct ShippingPayload {
  pub tracking_number: String,
  pub shipping_company: String,
}

#[instrument(name = "handler::list_shop_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn list_shop_orders_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  query: web::Query<ShopOrdersQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let (skip, limit) = app_state.config.page(query.skip, query.limit);
  let orders = orders::list_shop_orders(
    app_state.store.as_ref(),
    &auth_user.user,
    path.into_inner(),
    query.status,
    query.customer_id,
    skip,
    limit,
  )
  .await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::shop_order_summary", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn shop_order_summary_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let summary = orders::shop_order_summary(app_state.store.as_ref(), &auth_user.user, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(summary))
}

#[instrument(name = "handler::get_shop_order", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn get_shop_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let (shop_id, order_id) = path.into_inner();
  ensure_shop_access(&auth_user.user, shop_id, ShopAction::View)?;
  let detail = orders::get_order(app_state.store.as_ref(), &OrderRef::Id(order_id), OrderScope::Shop(shop_id)).await?;
  Ok(HttpResponse::Ok().json(detail))
}

#[instrument(name = "handler::update_shop_order_status", skip(app_state, auth_user, req_payload), fields(user_id = %auth_user.user.id))]
pub async fn update_shop_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  req_payload: web::Json<StatusPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let (shop_id, order_id) = path.into_inner();
  ensure_shop_access(&auth_user.user, shop_id, ShopAction::Update)?;
  let payload = req_payload.into_inner();
  let detail = orders::update_order_status(
    app_state.store.as_ref(),
    &OrderRef::Id(order_id),
    OrderScope::Shop(shop_id),
    payload.status,
    payload.comment,
  )
  .await?;
  Ok(HttpResponse::Ok().json(detail))
}

#[instrument(name = "handler::update_shop_order_payment", skip(app_state, auth_user, req_payload), fields(user_id = %auth_user.user.id))]
pub async fn update_shop_order_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  req_payload: web::Json<PaymentPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let (shop_id, order_id) = path.into_inner();
  ensure_shop_access(&auth_user.user, shop_id, ShopAction::Update)?;
  let detail = orders::update_payment_status(
    app_state.store.as_ref(),
    &OrderRef::Id(order_id),
    OrderScope::Shop(shop_id),
    req_payload.payment_status,
  )
  .await?;
  Ok(HttpResponse::Ok().json(detail))
}

#[instrument(name = "handler::update_shop_order_shipping", skip(app_state, auth_user, req_payload), fields(user_id = %auth_user.user.id))]
pub async fn update_shop_order_shipping_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  req_payload: web::Json<ShippingPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let (shop_id, order_id) = path.into_inner();
  ensure_shop_access(&auth_user.user, shop_id, ShopAction::Update)?;
  let detail = orders::update_shipping_info(
    app_state.store.as_ref(),
    &OrderRef::Id(order_id),
    OrderScope::Shop(shop_id),
    &req_payload.tracking_number,
    &req_payload.shipping_company,
  )
  .await?;
  Ok(HttpResponse::Ok().json(detail))
}
