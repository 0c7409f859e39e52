//! The [`SessionStore`] trait defining the storage contract.
//!
//! Two-layer API design:
//! - **Low-level append** methods (`insert_node`, `insert_edge`) mirror
//!   the engine's append-only lifecycle and serve as the incremental
//!   save mechanism: one call per accepted registration or commit.
//! - **High-level convenience** methods (`save_session`, `load_session`)
//!   move whole sessions through their [`GraphSnapshot`] form.
//!
//! Only the canonical node and edge lists are persisted. Ordering and
//! batches are recomputed on load; a backend that stored them would
//! invite drift against the edge list.
//!
//! All backends (in-memory, SQLite) implement this trait and are fully
//! swappable without changing engine logic.

use prddag_core::{DecompositionSession, GraphSnapshot};

use crate::error::StorageError;
use crate::types::{SessionId, SessionSummary};

/// The storage contract for decomposition sessions.
///
/// Synchronous by design: the engine itself is synchronous and
/// single-writer, and the persisted state is two small flat lists.
pub trait SessionStore {
    // -------------------------------------------------------------------
    // Session-level operations
    // -------------------------------------------------------------------

    /// Creates a new empty session record with the given name.
    fn create_session(&mut self, name: &str) -> Result<SessionId, StorageError>;

    /// Deletes a session and all its nodes and edges.
    fn delete_session(&mut self, id: SessionId) -> Result<(), StorageError>;

    /// Lists all stored sessions.
    fn list_sessions(&self) -> Result<Vec<SessionSummary>, StorageError>;

    // -------------------------------------------------------------------
    // Snapshot operations
    // -------------------------------------------------------------------

    /// Overwrites the stored node and edge lists for a session.
    fn save_snapshot(
        &mut self,
        id: SessionId,
        snapshot: &GraphSnapshot,
    ) -> Result<(), StorageError>;

    /// Loads the stored node and edge lists, in stored order.
    fn load_snapshot(&self, id: SessionId) -> Result<GraphSnapshot, StorageError>;

    // -------------------------------------------------------------------
    // Incremental append (one row per accepted mutation)
    // -------------------------------------------------------------------

    /// Appends one registered PRD. Idempotent, like registration itself.
    fn insert_node(&mut self, id: SessionId, key: &str) -> Result<(), StorageError>;

    /// Appends one committed edge. Idempotent; both endpoints must
    /// already be persisted.
    fn insert_edge(&mut self, id: SessionId, from: &str, to: &str) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // High-level convenience
    // -------------------------------------------------------------------

    /// Bulk save of a whole session via its snapshot.
    fn save_session(
        &mut self,
        id: SessionId,
        session: &DecompositionSession,
    ) -> Result<(), StorageError> {
        self.save_snapshot(id, &session.snapshot())
    }

    /// Reconstructs a [`DecompositionSession`] from stored data.
    ///
    /// Externally-mutated edge lists containing cycles still load: the
    /// engine excludes the cyclic nodes from its ordering and flags them
    /// in diagnostics. Only structurally unusable data (an edge naming a
    /// node that is not stored) fails reconstruction.
    fn load_session(&self, id: SessionId) -> Result<DecompositionSession, StorageError> {
        let snapshot = self.load_snapshot(id)?;
        DecompositionSession::from_snapshot(&snapshot).map_err(|e| {
            StorageError::Reconstruction {
                reason: e.to_string(),
            }
        })
    }
}
