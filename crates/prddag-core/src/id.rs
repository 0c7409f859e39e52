//! Dense PRD identifier for graph entities.
//!
//! Every registered PRD gets a [`PrdId`]: a newtype over `u32` mapping
//! directly to a petgraph `NodeIndex<u32>`. Nodes are never deleted, so
//! indices are dense (0..n) and stable for the life of the session.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Dense node identifier. Maps to a petgraph `NodeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrdId(pub u32);

impl PrdId {
    /// The inner index as `usize`, for indexing position tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PrdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Bridge between PrdId and petgraph's NodeIndex<u32>.

impl From<NodeIndex<u32>> for PrdId {
    fn from(idx: NodeIndex<u32>) -> Self {
        PrdId(idx.index() as u32)
    }
}

impl From<PrdId> for NodeIndex<u32> {
    fn from(id: PrdId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}
