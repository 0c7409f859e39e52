//! Database bootstrap for the SQLite backend.
//!
//! Schema changes ship as numbered SQL files under `migrations/`,
//! embedded at compile time with `include_str!` and applied through
//! `rusqlite_migration` (tracked in SQLite's `user_version` pragma).
//! Opening a database always leaves it at the latest schema version.

use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

use crate::error::StorageError;

/// The migration history, oldest first. Append-only: existing entries
/// never change once released.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(include_str!(
        "migrations/001_initial_schema.sql"
    ))])
}

/// Opens (or creates) the database at `path`, ready for use.
pub fn open_database(path: &str) -> Result<Connection, StorageError> {
    prepare(Connection::open(path)?)
}

/// Opens a fresh in-memory database, ready for use. WAL is a no-op
/// here; tests exercise the same pragma path as file-backed databases.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(mut conn: Connection) -> Result<Connection, StorageError> {
    // WAL keeps readers unblocked while a session save is in flight,
    // and NORMAL synchronous is durable under WAL. Foreign keys are off
    // by default in SQLite; the edge table relies on them.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    migrations()
        .to_latest(&mut conn)
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    Ok(conn)
}
