//! Flat persisted form of the dependency graph.
//!
//! Only the canonical node and edge lists are ever persisted. The
//! execution order and parallel batches are always recomputable from the
//! edge list, and persisting them would invite drift between a stored
//! ordering and the stored edges it was derived from.

use serde::{Deserialize, Serialize};

/// The persistable state of a decomposition session: two flat lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Registered PRD keys in registration order.
    pub nodes: Vec<String>,
    /// Committed (from, to) pairs in commit order.
    pub edges: Vec<(String, String)>,
}

impl GraphSnapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }
}
