// server/src/db/mod.rs

//! PostgreSQL implementation of the core store traits.

mod pg_store;

pub use pg_store::PgStore;
