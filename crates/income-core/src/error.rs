//! Error types for `income-core`.
//!
//! Callers only ever need to tell two situations apart: the thing they asked
//! for does not exist, or the backing store failed. [`Error::is_not_found`]
//! collapses the variants into that distinction.

use thiserror::Error;

use crate::snapshot::SnapshotId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("snapshot not found: {0}")]
  SnapshotNotFound(SnapshotId),

  /// No key mapping references the snapshot.
  #[error("no request key maps to snapshot {0}")]
  RequestKeyNotFound(SnapshotId),

  /// Any fault in the backing store, including constraint violations and
  /// undecodable rows.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend fault.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::SnapshotNotFound(_) | Error::RequestKeyNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn not_found_variants_are_distinguishable_from_store_faults() {
    let id = SnapshotId::generate();
    assert!(Error::SnapshotNotFound(id).is_not_found());
    assert!(Error::RequestKeyNotFound(id).is_not_found());

    let io = std::io::Error::other("disk on fire");
    assert!(!Error::store(io).is_not_found());
  }
}
