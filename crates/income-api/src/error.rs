//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use income_core::registry::RegistryError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("registry error: {0}")]
  Registry(#[from] RegistryError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<income_core::Error> for ApiError {
  fn from(e: income_core::Error) -> Self {
    if e.is_not_found() {
      ApiError::NotFound(e.to_string())
    } else {
      ApiError::Store(Box::new(e))
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Registry(e) => {
        tracing::error!(status = e.status, "registry request failed: {}", e.message);
        let status = StatusCode::from_u16(e.status)
          .ok()
          .filter(|s| s.is_client_error() || s.is_server_error())
          .unwrap_or(StatusCode::BAD_GATEWAY);
        (status, e.message.clone())
      }
      ApiError::Store(e) => {
        tracing::error!("store failure: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
