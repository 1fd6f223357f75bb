// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use autoparts_core::{CommerceError, FlowError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(format!("{:#}", other)),
    }
  }
}

impl From<CommerceError> for AppError {
  fn from(err: CommerceError) -> Self {
    match err {
      CommerceError::NotFound(m) => AppError::NotFound(m),
      CommerceError::Forbidden(m) => AppError::Forbidden(m),
      CommerceError::Store(source) => AppError::from(source),
      CommerceError::Flow(source) => AppError::Workflow { source },
      e if e.is_client_error() => AppError::Validation(e.to_string()),
      e => AppError::Internal(e.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Rejecting request");
    }
    let body = match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::Forbidden(m) | AppError::NotFound(m) => {
        json!({"error": m})
      }
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Sqlx(_) => json!({"error": "Database operation failed"}),
      AppError::Workflow { source } => {
        tracing::error!(workflow_error_source = ?source, "Workflow error details");
        json!({"error": "Workflow processing error", "detail": source.to_string()})
      }
      AppError::Internal(m) => json!({"error": "An internal error occurred", "detail": m}),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use autoparts_core::models::OrderStatus;

  #[test]
  fn commerce_errors_map_to_http_statuses() {
    let cases = [
      (CommerceError::EmptyCart, StatusCode::BAD_REQUEST),
      (
        CommerceError::InvalidTransition {
          from: OrderStatus::Pending,
          to: OrderStatus::Delivered,
        },
        StatusCode::BAD_REQUEST,
      ),
      (CommerceError::NotFound("Order not found".into()), StatusCode::NOT_FOUND),
      (CommerceError::Forbidden("Not enough permissions".into()), StatusCode::FORBIDDEN),
      (CommerceError::NoUnitOfWork, StatusCode::INTERNAL_SERVER_ERROR),
      (
        CommerceError::Store(anyhow::anyhow!("connection reset")),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];
    for (err, expected) in cases {
      assert_eq!(AppError::from(err).status_code(), expected);
    }
  }

  #[test]
  fn validation_keeps_domain_message() {
    let err = AppError::from(CommerceError::EmptyCart);
    assert!(matches!(err, AppError::Validation(ref m) if m == "Cart is empty"));
  }
}
