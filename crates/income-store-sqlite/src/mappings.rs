//! The key mapping index: append-only rows joining a request key to a
//! snapshot id.
//!
//! Like [`crate::snapshots`], everything here runs on a caller-supplied
//! connection so inserts can share the snapshot write's transaction.

use rusqlite::{Connection, OptionalExtension as _, params};

use crate::encode::RawKey;

/// Append a mapping row.
pub fn insert(
  conn: &Connection,
  key: &RawKey,
  snapshot_id: &str,
  created_at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO key_mappings
       (identity_id, decision_id, calculation_date, snapshot_id, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      key.identity_id,
      key.decision_id,
      key.calculation_date,
      snapshot_id,
      created_at,
    ],
  )?;
  Ok(())
}

/// The snapshot id of the newest mapping for `key`.
///
/// Equal timestamps fall back to insertion order, so the winner is stable.
pub fn latest(conn: &Connection, key: &RawKey) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT snapshot_id FROM key_mappings
       WHERE identity_id = ?1 AND decision_id = ?2 AND calculation_date = ?3
       ORDER BY created_at DESC, mapping_id DESC
       LIMIT 1",
      params![key.identity_id, key.decision_id, key.calculation_date],
      |row| row.get(0),
    )
    .optional()
}

/// The request key of a mapping that references `snapshot_id`.
///
/// The store writes exactly one mapping per snapshot. Should several exist
/// anyway, which one is returned is unspecified.
pub fn resolve_key(
  conn: &Connection,
  snapshot_id: &str,
) -> rusqlite::Result<Option<RawKey>> {
  conn
    .query_row(
      "SELECT identity_id, decision_id, calculation_date FROM key_mappings
       WHERE snapshot_id = ?1
       LIMIT 1",
      params![snapshot_id],
      |row| {
        Ok(RawKey {
          identity_id:      row.get(0)?,
          decision_id:      row.get(1)?,
          calculation_date: row.get(2)?,
        })
      },
    )
    .optional()
}

/// Every mapping for `key` as `(snapshot_id, created_at)`, oldest first.
pub fn history(conn: &Connection, key: &RawKey) -> rusqlite::Result<Vec<(String, String)>> {
  let mut stmt = conn.prepare(
    "SELECT snapshot_id, created_at FROM key_mappings
     WHERE identity_id = ?1 AND decision_id = ?2 AND calculation_date = ?3
     ORDER BY created_at ASC, mapping_id ASC",
  )?;
  let rows = stmt
    .query_map(
      params![key.identity_id, key.decision_id, key.calculation_date],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
