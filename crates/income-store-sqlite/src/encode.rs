//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with a fixed nanosecond fraction so that
//! string order equals time order. Dates are `YYYY-MM-DD`. Documents are
//! compact JSON.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use income_core::snapshot::{IncomeDocument, RequestKey, Snapshot, SnapshotId};

use crate::{Error, Result};

// ─── SnapshotId ──────────────────────────────────────────────────────────────

pub fn encode_id(id: SnapshotId) -> String { id.to_string() }

pub fn decode_id(s: &str) -> Result<SnapshotId> { Ok(s.parse()?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Document ────────────────────────────────────────────────────────────────

pub fn encode_document(doc: &IncomeDocument) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn decode_document(s: &str) -> Result<IncomeDocument> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// Column values of one `snapshots` row, before decoding.
pub struct RawSnapshot {
  pub snapshot_id:     String,
  pub document:        String,
  pub manually_edited: bool,
  pub created_at:      String,
}

impl RawSnapshot {
  pub fn into_snapshot(self) -> Result<Snapshot> {
    Ok(Snapshot {
      id:              decode_id(&self.snapshot_id)?,
      document:        decode_document(&self.document)?,
      manually_edited: self.manually_edited,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// The request-key columns of a `key_mappings` row.
#[derive(Debug, Clone)]
pub struct RawKey {
  pub identity_id:      String,
  pub decision_id:      i64,
  pub calculation_date: String,
}

impl RawKey {
  pub fn into_key(self) -> Result<RequestKey> {
    Ok(RequestKey {
      identity_id:      self.identity_id,
      decision_id:      self.decision_id,
      calculation_date: decode_date(&self.calculation_date)?,
    })
  }
}

impl From<&RequestKey> for RawKey {
  fn from(key: &RequestKey) -> Self {
    RawKey {
      identity_id:      key.identity_id.clone(),
      decision_id:      key.decision_id,
      calculation_date: encode_date(key.calculation_date),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 15, 9, 59, 59).unwrap();
    let b = a + chrono::Duration::nanoseconds(1);
    let c = a + chrono::Duration::seconds(1);
    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb && eb < ec);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn date_roundtrip() {
    let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert_eq!(encode_date(d), "2024-01-15");
    assert_eq!(decode_date("2024-01-15").unwrap(), d);
    assert!(decode_date("15.01.2024").is_err());
  }

  #[test]
  fn corrupt_snapshot_id_is_a_decode_error() {
    let raw = RawSnapshot {
      snapshot_id:     "garbage".into(),
      document:        "{}".into(),
      manually_edited: false,
      created_at:      encode_dt(Utc::now()),
    };
    assert!(matches!(raw.into_snapshot(), Err(Error::SnapshotId(_))));
  }
}
