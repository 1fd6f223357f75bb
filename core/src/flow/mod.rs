// core/src/flow/mod.rs

//! A small async workflow engine: named steps, `before`/`on`/`after` hooks,
//! skip conditions and a type-keyed registry.

mod context_data;
mod control;
mod error;
mod execution;
mod registry;
mod step;
mod workflow;

pub use context_data::ContextData;
pub use control::{FlowOutcome, StepControl};
pub use error::FlowError;
pub use registry::Workflows;
pub use step::{SkipCondition, StepDef};
pub use workflow::{Handler, Workflow};
