// core/src/lib.rs

//! Core of the auto-parts marketplace backend.
//!
//! A customer's cart may hold listings from many shops. Checkout splits it
//! into one order per shop, snapshots prices, decrements stock and clears the
//! cart inside a single unit of work. Orders then move through a fixed status
//! table driven by shop staff and the customer.
//!
//! Multi-step operations run as [`flow::Workflow`]s: named steps with
//! `before`/`on`/`after` handlers over a shared [`flow::ContextData`].
//! Persistence sits behind [`store::CommerceStore`]; [`store::InMemoryStore`]
//! backs tests and benchmarks.

pub mod access;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod flow;
pub mod inventory;
pub mod models;
pub mod orders;
pub mod store;

pub use error::{CommerceError, CommerceResult};
pub use flow::{ContextData, FlowError, FlowOutcome, StepControl, Workflow, Workflows};
