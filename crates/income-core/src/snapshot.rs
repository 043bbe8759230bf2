//! Snapshots, request keys and the mappings that join them.
//!
//! A [`Snapshot`] is immutable once written. Corrections never touch an
//! existing row: they append a new snapshot plus a new [`KeyMapping`] for the
//! same [`RequestKey`], and lookups resolve to the newest mapping.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

// ─── SnapshotId ──────────────────────────────────────────────────────────────

/// Lexically sortable, time-ordered snapshot identifier (a ULID).
///
/// The string form is 26 Crockford base32 characters; comparing two ids as
/// strings orders them by generation time at millisecond resolution.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SnapshotId(Ulid);

impl SnapshotId {
  /// Generate a fresh identifier from the current time plus 80 random bits.
  /// Cannot fail and keeps no persisted counter.
  pub fn generate() -> Self { SnapshotId(Ulid::new()) }

  pub fn as_ulid(&self) -> Ulid { self.0 }
}

impl From<Ulid> for SnapshotId {
  fn from(u: Ulid) -> Self { SnapshotId(u) }
}

impl fmt::Display for SnapshotId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for SnapshotId {
  type Err = ulid::DecodeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ulid::from_string(s).map(SnapshotId)
  }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// The raw income document returned by the registry, or a manually edited
/// copy of one. The store treats it as an opaque blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncomeDocument(pub serde_json::Value);

impl IncomeDocument {
  pub fn into_inner(self) -> serde_json::Value { self.0 }
}

impl From<serde_json::Value> for IncomeDocument {
  fn from(v: serde_json::Value) -> Self { IncomeDocument(v) }
}

// ─── RequestKey ──────────────────────────────────────────────────────────────

/// Whose income, for which decision, as of which date.
///
/// Not unique to one snapshot: a key accumulates one mapping per fetch or
/// correction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
  pub identity_id:      String,
  pub decision_id:      i64,
  pub calculation_date: NaiveDate,
}

impl RequestKey {
  pub fn new(
    identity_id: impl Into<String>,
    decision_id: i64,
    calculation_date: NaiveDate,
  ) -> Self {
    Self { identity_id: identity_id.into(), decision_id, calculation_date }
  }
}

impl fmt::Display for RequestKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}/{}/{}",
      self.identity_id, self.decision_id, self.calculation_date
    )
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// A stored income document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  pub id:              SnapshotId,
  pub document:        IncomeDocument,
  pub manually_edited: bool,
  /// Assigned by the store at write time.
  pub created_at:      DateTime<Utc>,
}

/// One append-only row joining a [`RequestKey`] to a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMapping {
  pub key:         RequestKey,
  pub snapshot_id: SnapshotId,
  pub created_at:  DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn snapshot_id_string_roundtrip() {
    let id = SnapshotId::generate();
    let s = id.to_string();
    assert_eq!(s.len(), 26);
    assert_eq!(s.parse::<SnapshotId>().unwrap(), id);
  }

  #[test]
  fn snapshot_id_rejects_garbage() {
    assert!("not-a-ulid".parse::<SnapshotId>().is_err());
  }

  #[test]
  fn snapshot_ids_sort_by_generation_time() {
    let first = SnapshotId::generate();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = SnapshotId::generate();
    assert!(first.to_string() < second.to_string());
    assert!(first < second);
  }

  #[test]
  fn snapshot_ids_are_unique() {
    let ids: std::collections::HashSet<_> =
      (0..1000).map(|_| SnapshotId::generate()).collect();
    assert_eq!(ids.len(), 1000);
  }

  #[test]
  fn request_key_display() {
    let key = RequestKey::new(
      "12345678901",
      42,
      NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    );
    assert_eq!(key.to_string(), "12345678901/42/2024-01-15");
  }
}
