//! Contract for the external income registry.
//!
//! The registry is a remote service; this crate only fixes the shape of the
//! call so the HTTP layer can be tested against a fake.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  period::{EarningPeriod, YearMonth},
  snapshot::{IncomeDocument, RequestKey},
};

/// A request for all income reported for one identity over a month range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRequest {
  pub identity_id: String,
  pub from_month:  YearMonth,
  pub to_month:    YearMonth,
}

impl RegistryRequest {
  /// Build the request covering the earning period of `key`'s calculation
  /// date.
  pub fn for_key(key: &RequestKey) -> Self {
    let period = EarningPeriod::from_calculation_date(key.calculation_date);
    Self {
      identity_id: key.identity_id.clone(),
      from_month:  period.first_month,
      to_month:    period.last_month,
    }
  }
}

/// A failed registry call, carrying the HTTP-like status of the remote fault.
#[derive(Debug, Clone, Error)]
#[error("registry responded {status}: {message}")]
pub struct RegistryError {
  pub status:  u16,
  pub message: String,
}

pub trait IncomeRegistry: Send + Sync {
  /// Fetch a fresh income document for `request`.
  fn fetch(
    &self,
    request: RegistryRequest,
  ) -> impl Future<Output = Result<IncomeDocument, RegistryError>> + Send + '_;
}
