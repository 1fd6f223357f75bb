// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use autoparts_core::cart::{self, settle_add_to_cart, AddToCartCtxData};
use autoparts_core::ContextData;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct AddToCartPayload {
  #[serde(alias = "product_id")]
  pub listing_id: Uuid,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartItemPayload {
  pub quantity: i32,
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let summary = cart::cart_summary(app_state.store.as_ref(), auth_user.user.id).await?;
  Ok(HttpResponse::Ok().json(summary))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user.id, listing_id = %req_payload.listing_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(AddToCartCtxData::new(
    app_state.store.clone(),
    auth_user.user.id,
    req_payload.listing_id,
    req_payload.quantity,
  ));

  let outcome = app_state.workflows.run(ctx_data.clone()).await;
  let item = settle_add_to_cart(&ctx_data, outcome).await?;

  info!(cart_item_id = %item.id, quantity = item.quantity, "Cart item saved.");
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(name = "handler::update_cart_item", skip(app_state, auth_user, req_payload), fields(user_id = %auth_user.user.id))]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateCartItemPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let item = cart::update_cart_item(
    app_state.store.as_ref(),
    auth_user.user.id,
    path.into_inner(),
    req_payload.quantity,
  )
  .await?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart::remove_cart_item(app_state.store.as_ref(), auth_user.user.id, path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let removed = cart::clear_cart(app_state.store.as_ref(), auth_user.user.id).await?;
  info!(removed, "Cart cleared.");
  Ok(HttpResponse::NoContent().finish())
}
