//! Storage-layer types for session identity and metadata.
//!
//! [`SessionId`] is defined here (not in prddag-core) because session
//! identity is a storage concern: a decomposition only gains an ID when
//! persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a stored session.
///
/// The inner `i64` aligns with SQLite's `INTEGER PRIMARY KEY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

/// Summary of a stored session (for listing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub id: SessionId,
    /// Session name.
    pub name: String,
}
