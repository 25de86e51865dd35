//! Storage layer
//!
//! SQLite schema management and the error type shared by every store
//! operation. The store itself lives in `crate::store`.

pub mod error;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
