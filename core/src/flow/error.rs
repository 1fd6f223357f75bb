// core/src/flow/error.rs

use thiserror::Error;

/// Failures raised by the workflow engine itself rather than by step handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for required step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No workflow registered for context type {context_type}")]
  NotRegistered { context_type: String },

  #[error("Context type mismatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },
}
