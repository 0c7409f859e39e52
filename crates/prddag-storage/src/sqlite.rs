//! SQLite implementation of [`SessionStore`].
//!
//! [`SqliteSessionStore`] persists decomposition sessions in a SQLite
//! database with WAL mode, atomic transactions on every bulk write, and
//! automatic schema migrations. The graph is stored as flat TEXT rows
//! (one per node, one per edge); row order preserves registration and
//! commit order.

use prddag_core::GraphSnapshot;
use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::traits::SessionStore;
use crate::types::{SessionId, SessionSummary};

/// SQLite-backed implementation of [`SessionStore`].
///
/// Every bulk write is wrapped in a transaction for atomicity. The
/// database uses WAL mode for performance and foreign keys for
/// integrity.
pub struct SqliteSessionStore {
    conn: Connection,
}

impl SqliteSessionStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteSessionStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteSessionStore { conn })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Verifies a session exists, returning an error if not.
    fn assert_session_exists(conn: &Connection, id: SessionId) -> Result<(), StorageError> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = ?1)",
            params![id.0],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StorageError::SessionNotFound(id.0));
        }
        Ok(())
    }
}

impl SessionStore for SqliteSessionStore {
    fn create_session(&mut self, name: &str) -> Result<SessionId, StorageError> {
        self.conn
            .execute("INSERT INTO sessions (name) VALUES (?1)", params![name])?;
        Ok(SessionId(self.conn.last_insert_rowid()))
    }

    fn delete_session(&mut self, id: SessionId) -> Result<(), StorageError> {
        // Nodes and edges follow via ON DELETE CASCADE.
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id.0])?;
        if affected == 0 {
            return Err(StorageError::SessionNotFound(id.0));
        }
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<SessionSummary>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM sessions ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(SessionSummary {
                id: SessionId(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    fn save_snapshot(
        &mut self,
        id: SessionId,
        snapshot: &GraphSnapshot,
    ) -> Result<(), StorageError> {
        Self::assert_session_exists(&self.conn, id)?;
        let tx = self.conn.transaction()?;

        // Replace existing data, edges first to respect foreign keys.
        tx.execute("DELETE FROM prd_edges WHERE session_id = ?1", params![id.0])?;
        tx.execute("DELETE FROM prd_nodes WHERE session_id = ?1", params![id.0])?;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO prd_nodes (session_id, node_key) VALUES (?1, ?2)",
            )?;
            for key in &snapshot.nodes {
                stmt.execute(params![id.0, key])?;
            }
        }
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO prd_edges (session_id, from_key, to_key) VALUES (?1, ?2, ?3)",
            )?;
            for (from, to) in &snapshot.edges {
                stmt.execute(params![id.0, from, to])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_snapshot(&self, id: SessionId) -> Result<GraphSnapshot, StorageError> {
        Self::assert_session_exists(&self.conn, id)?;

        // rowid order reproduces registration and commit order.
        let mut stmt = self.conn.prepare(
            "SELECT node_key FROM prd_nodes WHERE session_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![id.0], |row| row.get::<_, String>(0))?;
        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(row?);
        }

        let mut stmt = self.conn.prepare(
            "SELECT from_key, to_key FROM prd_edges WHERE session_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![id.0], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut edges = Vec::new();
        for row in rows {
            edges.push(row?);
        }

        Ok(GraphSnapshot { nodes, edges })
    }

    fn insert_node(&mut self, id: SessionId, key: &str) -> Result<(), StorageError> {
        Self::assert_session_exists(&self.conn, id)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO prd_nodes (session_id, node_key) VALUES (?1, ?2)",
            params![id.0, key],
        )?;
        Ok(())
    }

    fn insert_edge(&mut self, id: SessionId, from: &str, to: &str) -> Result<(), StorageError> {
        Self::assert_session_exists(&self.conn, id)?;
        // Foreign keys reject edges to unpersisted nodes.
        self.conn.execute(
            "INSERT OR IGNORE INTO prd_edges (session_id, from_key, to_key) VALUES (?1, ?2, ?3)",
            params![id.0, from, to],
        )?;
        Ok(())
    }
}
