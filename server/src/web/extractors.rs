// server/src/web/extractors.rs

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use autoparts_core::models::User;
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// The caller, resolved from the identity header set by the upstream
/// authentication layer. Only active users get through.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let app_state = req.app_data::<web::Data<AppState>>().cloned();
    let raw_identity = app_state
      .as_ref()
      .and_then(|state| req.headers().get(state.config.identity_header.as_str()))
      .and_then(|value| value.to_str().ok())
      .map(|value| value.trim().to_string());

    Box::pin(async move {
      let app_state =
        app_state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let raw_identity = raw_identity.ok_or_else(|| {
        warn!(header = %app_state.config.identity_header, "Missing identity header.");
        AppError::Auth("Not authenticated".to_string())
      })?;
      let user_id = Uuid::parse_str(&raw_identity).map_err(|_| {
        warn!(identity = %raw_identity, "Identity header is not a valid user id.");
        AppError::Auth("Could not validate credentials".to_string())
      })?;

      let mut uow = app_state.store.begin().await?;
      let user = uow.find_user(user_id).await?;
      uow.rollback().await?;

      match user {
        Some(user) if user.is_active => Ok(AuthenticatedUser { user }),
        _ => {
          warn!(%user_id, "Unknown or inactive user.");
          Err(AppError::Auth("Could not validate credentials".to_string()))
        }
      }
    })
  }
}
