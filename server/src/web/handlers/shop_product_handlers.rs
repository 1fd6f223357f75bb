// server/src/web/handlers/shop_product_handlers.rs

use actix_web::{web, HttpResponse};
use autoparts_core::inventory;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct StockPayload {
  pub quantity_change: i32,
}

#[instrument(name = "handler::get_shop_product", skip(app_state, path), fields(listing_id = %path.as_ref()))]
pub async fn get_shop_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let listing = inventory::get_listing(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(listing))
}

/// Signed stock delta; the result never drops below zero.
#[instrument(
  name = "handler::update_shop_product_stock",
  skip(app_state, auth_user, req_payload),
  fields(user_id = %auth_user.user.id, quantity_change = req_payload.quantity_change)
)]
pub async fn update_stock_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<StockPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let listing = inventory::adjust_stock(
    app_state.store.as_ref(),
    &auth_user.user,
    path.into_inner(),
    req_payload.quantity_change,
  )
  .await?;
  Ok(HttpResponse::Ok().json(listing))
}
