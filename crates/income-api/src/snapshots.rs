//! Handlers for `/v1/snapshots/{id}` endpoints.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use income_core::{
  registry::IncomeRegistry,
  snapshot::{IncomeDocument, RequestKey, Snapshot, SnapshotId},
  store::IncomeStore,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::ApiError};

fn parse_id(raw: &str) -> Result<SnapshotId, ApiError> {
  raw
    .parse()
    .map_err(|e| ApiError::BadRequest(format!("invalid snapshot id {raw:?}: {e}")))
}

/// `GET /v1/snapshots/:id`
pub async fn get_one<S, R>(
  State(state): State<AppState<S, R>>,
  Path(id): Path<String>,
) -> Result<Json<Snapshot>, ApiError>
where
  S: IncomeStore,
  R: IncomeRegistry,
{
  let id = parse_id(&id)?;
  Ok(Json(state.store.get_snapshot(id).await?))
}

/// JSON body accepted by `POST /v1/snapshots/:id/correct`.
#[derive(Debug, Deserialize)]
pub struct CorrectBody {
  pub document: IncomeDocument,
}

/// `POST /v1/snapshots/:id/correct` — stores a manually edited replacement and
/// returns it. The original snapshot is left untouched.
pub async fn correct<S, R>(
  State(state): State<AppState<S, R>>,
  Path(id): Path<String>,
  Json(body): Json<CorrectBody>,
) -> Result<Json<Snapshot>, ApiError>
where
  S: IncomeStore,
  R: IncomeRegistry,
{
  let old_id = parse_id(&id)?;
  let snapshot = state.store.correct_snapshot(old_id, body.document).await?;
  info!(%old_id, new_id = %snapshot.id, "stored corrected income");
  Ok(Json(snapshot))
}

/// `GET /v1/snapshots/:id/request-key`
pub async fn request_key<S, R>(
  State(state): State<AppState<S, R>>,
  Path(id): Path<String>,
) -> Result<Json<RequestKey>, ApiError>
where
  S: IncomeStore,
  R: IncomeRegistry,
{
  let id = parse_id(&id)?;
  Ok(Json(state.store.get_request_key(id).await?))
}

#[derive(Debug, Serialize)]
pub struct CalculationDate {
  pub calculation_date: NaiveDate,
}

/// `GET /v1/snapshots/:id/calculation-date`
pub async fn calculation_date<S, R>(
  State(state): State<AppState<S, R>>,
  Path(id): Path<String>,
) -> Result<Json<CalculationDate>, ApiError>
where
  S: IncomeStore,
  R: IncomeRegistry,
{
  let id = parse_id(&id)?;
  let calculation_date = state.store.get_calculation_date(id).await?;
  Ok(Json(CalculationDate { calculation_date }))
}
