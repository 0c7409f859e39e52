//! Storage error types for prddag-storage.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying SQLite failure (includes foreign-key violations when
    /// an edge references a node that was never persisted).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A session with the given ID was not found.
    #[error("session not found: {0}")]
    SessionNotFound(i64),

    /// A schema migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// A data integrity violation was detected.
    #[error("integrity error: {reason}")]
    Integrity { reason: String },

    /// Failed to reconstruct a session from stored data.
    #[error("reconstruction error: {reason}")]
    Reconstruction { reason: String },
}
