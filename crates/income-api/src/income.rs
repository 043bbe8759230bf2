//! Handlers for `/v1/income/{identity_id}/{decision_id}/{calculation_date}`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/v1/income/:key` | Stored snapshot, or fetch from the registry and store it |
//! | `GET`  | `/v1/income/cached/:key` | Stored snapshot only; 404 if none |
//! | `GET`  | `/v1/income/uncached/:key` | Registry document; nothing is stored |
//! | `POST` | `/v1/income/:key` | Body: [`StoreBody`]; returns 201 + stored snapshot |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use income_core::{
  registry::{IncomeRegistry, RegistryRequest},
  snapshot::{IncomeDocument, RequestKey, Snapshot},
  store::IncomeStore,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError};

/// Raw path segments of a request key, validated by [`KeyParams::into_key`].
#[derive(Debug, Deserialize)]
pub struct KeyParams {
  pub identity_id:      String,
  pub decision_id:      String,
  pub calculation_date: String,
}

impl KeyParams {
  pub fn into_key(self) -> Result<RequestKey, ApiError> {
    if self.identity_id.trim().is_empty() {
      return Err(ApiError::BadRequest("identity id must not be empty".into()));
    }
    let decision_id = self.decision_id.parse::<i64>().map_err(|e| {
      ApiError::BadRequest(format!("invalid decision id {:?}: {e}", self.decision_id))
    })?;
    let calculation_date =
      NaiveDate::parse_from_str(&self.calculation_date, "%Y-%m-%d").map_err(|e| {
        ApiError::BadRequest(format!(
          "invalid calculation date {:?}: {e}",
          self.calculation_date
        ))
      })?;
    Ok(RequestKey { identity_id: self.identity_id, decision_id, calculation_date })
  }
}

// ─── Get or fetch ─────────────────────────────────────────────────────────────

/// `GET /v1/income/:key`
pub async fn get_or_fetch<S, R>(
  State(state): State<AppState<S, R>>,
  Path(params): Path<KeyParams>,
) -> Result<Json<Snapshot>, ApiError>
where
  S: IncomeStore,
  R: IncomeRegistry,
{
  let key = params.into_key()?;

  if let Some(id) = state.store.find_snapshot_id(&key).await? {
    return Ok(Json(state.store.get_snapshot(id).await?));
  }

  let request = RegistryRequest::for_key(&key);
  info!(
    %key,
    from = %request.from_month,
    to = %request.to_month,
    "no stored income, fetching from registry"
  );
  let document = state.registry.fetch(request).await?;
  let snapshot = state.store.insert_snapshot(key, document, false).await?;
  Ok(Json(snapshot))
}

// ─── Cached ───────────────────────────────────────────────────────────────────

/// `GET /v1/income/cached/:key`
pub async fn cached<S, R>(
  State(state): State<AppState<S, R>>,
  Path(params): Path<KeyParams>,
) -> Result<Json<Snapshot>, ApiError>
where
  S: IncomeStore,
  R: IncomeRegistry,
{
  let key = params.into_key()?;
  let id = state
    .store
    .find_snapshot_id(&key)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no income stored for {key}")))?;
  Ok(Json(state.store.get_snapshot(id).await?))
}

// ─── Uncached ─────────────────────────────────────────────────────────────────

/// `GET /v1/income/uncached/:key`
pub async fn uncached<S, R>(
  State(state): State<AppState<S, R>>,
  Path(params): Path<KeyParams>,
) -> Result<Json<IncomeDocument>, ApiError>
where
  S: IncomeStore,
  R: IncomeRegistry,
{
  let key = params.into_key()?;
  let request = RegistryRequest::for_key(&key);
  info!(%key, "fetching uncached income from registry");
  Ok(Json(state.registry.fetch(request).await?))
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /v1/income/:key`.
#[derive(Debug, Deserialize)]
pub struct StoreBody {
  pub document:        IncomeDocument,
  #[serde(default)]
  pub manually_edited: bool,
}

/// `POST /v1/income/:key` — returns 201 + the stored [`Snapshot`].
pub async fn store<S, R>(
  State(state): State<AppState<S, R>>,
  Path(params): Path<KeyParams>,
  Json(body): Json<StoreBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IncomeStore,
  R: IncomeRegistry,
{
  let key = params.into_key()?;
  let snapshot = state
    .store
    .insert_snapshot(key, body.document, body.manually_edited)
    .await?;
  Ok((StatusCode::CREATED, Json(snapshot)))
}
