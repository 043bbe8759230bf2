//! SQL schema for the income snapshot store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Snapshots are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS snapshots (
    snapshot_id     TEXT PRIMARY KEY,   -- ULID
    document        TEXT NOT NULL,      -- raw registry document as JSON
    manually_edited INTEGER NOT NULL DEFAULT 0 CHECK (manually_edited IN (0, 1)),
    created_at      TEXT NOT NULL       -- RFC 3339 UTC, nanosecond precision
);

-- Many mappings per request key; the newest one is current.
CREATE TABLE IF NOT EXISTS key_mappings (
    mapping_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    identity_id      TEXT NOT NULL,
    decision_id      INTEGER NOT NULL,
    calculation_date TEXT NOT NULL,     -- YYYY-MM-DD
    snapshot_id      TEXT NOT NULL REFERENCES snapshots(snapshot_id),
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS key_mappings_key_idx
    ON key_mappings(identity_id, decision_id, calculation_date, created_at);
CREATE INDEX IF NOT EXISTS key_mappings_snapshot_idx
    ON key_mappings(snapshot_id);

PRAGMA user_version = 1;
";
