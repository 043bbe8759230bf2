//! The snapshot repository: one row per stored document.
//!
//! Functions here take a plain [`rusqlite::Connection`] so the caller decides
//! the transaction boundary; a [`rusqlite::Transaction`] derefs to one.

use rusqlite::{Connection, OptionalExtension as _, params};

use crate::encode::RawSnapshot;

/// Write one snapshot row. Fails on a duplicate id or any storage fault.
pub fn insert(
  conn: &Connection,
  snapshot_id: &str,
  document: &str,
  manually_edited: bool,
  created_at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO snapshots (snapshot_id, document, manually_edited, created_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![snapshot_id, document, manually_edited, created_at],
  )?;
  Ok(())
}

/// Read one snapshot row, or `None` if no row has that id.
pub fn get(
  conn: &Connection,
  snapshot_id: &str,
) -> rusqlite::Result<Option<RawSnapshot>> {
  conn
    .query_row(
      "SELECT snapshot_id, document, manually_edited, created_at
       FROM snapshots WHERE snapshot_id = ?1",
      params![snapshot_id],
      |row| {
        Ok(RawSnapshot {
          snapshot_id:     row.get(0)?,
          document:        row.get(1)?,
          manually_edited: row.get(2)?,
          created_at:      row.get(3)?,
        })
      },
    )
    .optional()
}
