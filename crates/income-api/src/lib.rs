//! JSON HTTP API for the income snapshot store.
//!
//! Exposes an axum [`Router`] backed by any [`IncomeStore`] and
//! [`IncomeRegistry`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = income_api::api_router(Arc::new(store), Arc::new(registry));
//! ```

pub mod error;
pub mod income;
pub mod snapshots;

use std::sync::Arc;

use axum::{
  Router,
  http::StatusCode,
  routing::{get, post},
};
use income_core::{registry::IncomeRegistry, store::IncomeStore};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S, R> {
  pub store:    Arc<S>,
  pub registry: Arc<R>,
}

impl<S, R> Clone for AppState<S, R> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), registry: self.registry.clone() }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, R>(store: Arc<S>, registry: Arc<R>) -> Router<()>
where
  S: IncomeStore + 'static,
  R: IncomeRegistry + 'static,
{
  const KEY: &str = "{identity_id}/{decision_id}/{calculation_date}";

  Router::new()
    // Lookup by request key
    .route(
      &format!("/v1/income/{KEY}"),
      get(income::get_or_fetch::<S, R>).post(income::store::<S, R>),
    )
    .route(&format!("/v1/income/cached/{KEY}"), get(income::cached::<S, R>))
    .route(&format!("/v1/income/uncached/{KEY}"), get(income::uncached::<S, R>))
    // Lookup by snapshot id
    .route("/v1/snapshots/{id}", get(snapshots::get_one::<S, R>))
    .route("/v1/snapshots/{id}/correct", post(snapshots::correct::<S, R>))
    .route("/v1/snapshots/{id}/request-key", get(snapshots::request_key::<S, R>))
    .route(
      "/v1/snapshots/{id}/calculation-date",
      get(snapshots::calculation_date::<S, R>),
    )
    // Probes
    .route("/isalive", get(|| async { StatusCode::OK }))
    .route("/isready", get(|| async { StatusCode::OK }))
    .with_state(AppState { store, registry })
}
