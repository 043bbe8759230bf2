//! [`SqliteStore`] — the SQLite implementation of [`IncomeStore`].

use std::path::Path;

use chrono::Utc;
use income_core::{
  snapshot::{IncomeDocument, KeyMapping, RequestKey, Snapshot, SnapshotId},
  store::IncomeStore,
};
use tracing::debug;

use crate::{
  Result,
  encode::{RawKey, decode_dt, decode_id, encode_document, encode_dt, encode_id},
  mappings,
  schema::SCHEMA,
  snapshots,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An income snapshot store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// serialisation between concurrent writers is left to SQLite.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  /// Wrap an already-open connection, initialising the schema on it.
  pub async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every mapping ever written for `key`, oldest first. The last entry is
  /// the one [`IncomeStore::find_snapshot_id`] resolves to.
  pub async fn key_history(&self, key: &RequestKey) -> Result<Vec<KeyMapping>> {
    let raw_key = RawKey::from(key);

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| Ok(mappings::history(conn, &raw_key)?))
      .await?;

    rows
      .into_iter()
      .map(|(id, at)| -> Result<KeyMapping> {
        Ok(KeyMapping {
          key:         key.clone(),
          snapshot_id: decode_id(&id)?,
          created_at:  decode_dt(&at)?,
        })
      })
      .collect()
  }

  async fn latest(&self, key: &RequestKey) -> Result<Option<SnapshotId>> {
    let raw_key = RawKey::from(key);

    let id_str: Option<String> = self
      .conn
      .call(move |conn| Ok(mappings::latest(conn, &raw_key)?))
      .await?;

    id_str.as_deref().map(decode_id).transpose()
  }

  async fn get(&self, id: SnapshotId) -> Result<Snapshot> {
    let id_str = encode_id(id);

    let raw = self
      .conn
      .call(move |conn| Ok(snapshots::get(conn, &id_str)?))
      .await?
      .ok_or(income_core::Error::SnapshotNotFound(id))?;

    raw.into_snapshot()
  }

  async fn resolve_key(&self, id: SnapshotId) -> Result<RequestKey> {
    let id_str = encode_id(id);

    let raw = self
      .conn
      .call(move |conn| Ok(mappings::resolve_key(conn, &id_str)?))
      .await?
      .ok_or(income_core::Error::RequestKeyNotFound(id))?;

    raw.into_key()
  }

  /// Write the snapshot row and its key mapping in one transaction, then read
  /// the snapshot back.
  async fn insert(
    &self,
    key: RequestKey,
    document: IncomeDocument,
    manually_edited: bool,
  ) -> Result<Snapshot> {
    let id = SnapshotId::generate();

    let id_str   = encode_id(id);
    let doc_str  = encode_document(&document)?;
    let raw_key  = RawKey::from(&key);
    let at_str   = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        snapshots::insert(&tx, &id_str, &doc_str, manually_edited, &at_str)?;
        mappings::insert(&tx, &raw_key, &id_str, &at_str)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(snapshot_id = %id, %key, manually_edited, "stored income snapshot");

    self.get(id).await
  }
}

// ─── IncomeStore impl ────────────────────────────────────────────────────────

impl IncomeStore for SqliteStore {
  async fn find_snapshot_id(
    &self,
    key: &RequestKey,
  ) -> income_core::Result<Option<SnapshotId>> {
    Ok(self.latest(key).await?)
  }

  async fn get_snapshot(&self, id: SnapshotId) -> income_core::Result<Snapshot> {
    Ok(self.get(id).await?)
  }

  async fn get_request_key(
    &self,
    id: SnapshotId,
  ) -> income_core::Result<RequestKey> {
    Ok(self.resolve_key(id).await?)
  }

  async fn insert_snapshot(
    &self,
    key: RequestKey,
    document: IncomeDocument,
    manually_edited: bool,
  ) -> income_core::Result<Snapshot> {
    Ok(self.insert(key, document, manually_edited).await?)
  }
}
