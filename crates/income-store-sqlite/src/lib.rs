//! SQLite backend for the income snapshot store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The two tables are handled by
//! [`snapshots`] and [`mappings`]; [`SqliteStore`] composes them and owns the
//! transaction that keeps them consistent.

mod encode;
mod mappings;
mod schema;
mod snapshots;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
