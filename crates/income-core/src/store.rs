//! The `IncomeStore` trait.
//!
//! Implemented by storage backends (e.g. `income-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  Result,
  snapshot::{IncomeDocument, RequestKey, Snapshot, SnapshotId},
};

/// Persistence and lookup of income snapshots.
///
/// Snapshots and key mappings are append-only. Every write creates one
/// snapshot and one mapping atomically; nothing is ever updated or deleted.
/// No in-process locking is done: concurrent writers for the same key both
/// succeed and the newest mapping wins lookups.
pub trait IncomeStore: Send + Sync {
  /// The snapshot id of the most recent mapping for `key`, or `None` if the
  /// key has never been stored.
  fn find_snapshot_id<'a>(
    &'a self,
    key: &'a RequestKey,
  ) -> impl Future<Output = Result<Option<SnapshotId>>> + Send + 'a;

  /// Fetch a snapshot by id. Fails with
  /// [`Error::SnapshotNotFound`](crate::Error::SnapshotNotFound) if absent.
  fn get_snapshot(
    &self,
    id: SnapshotId,
  ) -> impl Future<Output = Result<Snapshot>> + Send + '_;

  /// Recover the request key a snapshot was stored under. Fails with
  /// [`Error::RequestKeyNotFound`](crate::Error::RequestKeyNotFound) if no
  /// mapping references `id`.
  fn get_request_key(
    &self,
    id: SnapshotId,
  ) -> impl Future<Output = Result<RequestKey>> + Send + '_;

  /// Store `document` as a new snapshot under `key` and return it as read
  /// back from the store.
  fn insert_snapshot(
    &self,
    key: RequestKey,
    document: IncomeDocument,
    manually_edited: bool,
  ) -> impl Future<Output = Result<Snapshot>> + Send + '_;

  /// Store `document` as a manually edited replacement for `old_id`, under
  /// the same request key. The old snapshot stays retrievable by id.
  fn correct_snapshot(
    &self,
    old_id: SnapshotId,
    document: IncomeDocument,
  ) -> impl Future<Output = Result<Snapshot>> + Send + '_ {
    async move {
      let key = self.get_request_key(old_id).await?;
      self.insert_snapshot(key, document, true).await
    }
  }

  /// The calculation date of the key `id` was stored under.
  fn get_calculation_date(
    &self,
    id: SnapshotId,
  ) -> impl Future<Output = Result<NaiveDate>> + Send + '_ {
    async move { Ok(self.get_request_key(id).await?.calculation_date) }
  }
}
