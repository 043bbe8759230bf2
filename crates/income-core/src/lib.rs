//! Core types and trait definitions for the income snapshot store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::IncomeStore`]; the HTTP layer depends
//! on that trait and on [`registry::IncomeRegistry`], never on a backend.

// We intentionally use native `async fn` in traits.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod period;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
