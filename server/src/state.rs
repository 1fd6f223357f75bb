// server/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use autoparts_core::store::CommerceStore;
use autoparts_core::Workflows;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn CommerceStore>,
  pub workflows: Arc<Workflows<AppError>>,
  pub config: Arc<AppConfig>,
}
