//! DependencyStore: canonical storage of PRD nodes and committed edges.
//!
//! [`DependencyStore`] owns the adjacency structure and nothing else: no
//! cycle checks, no ordering, no diagnostics. Callers go through
//! [`crate::session::DecompositionSession`], which runs the cycle detector
//! before any edge reaches [`DependencyStore::commit_edge`].
//!
//! String PRD keys are mapped to dense integer indices at the boundary:
//! the insertion-ordered `IndexMap` resolves keys to [`PrdId`]s, and the
//! petgraph `StableGraph` holds integer-indexed adjacency. Nodes and edges
//! are never removed, so indices stay dense and stable.

use indexmap::IndexMap;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::id::PrdId;

/// Node payload: the PRD's opaque string key. Carries no algorithmic
/// state beyond identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrdNode {
    /// The caller-supplied PRD identifier.
    pub key: String,
}

/// Edge payload for a "from must complete before to" relationship.
/// Unweighted; the pair itself is the whole meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepEdge;

/// Canonical storage of nodes and committed edges.
///
/// Exposes registration, low-level edge commit, and read-only adjacency
/// queries. No removal operations exist: the graph is append-only and is
/// destroyed with the owning session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyStore {
    graph: StableGraph<PrdNode, DepEdge, Directed, u32>,
    /// Key-to-index map, insertion-ordered so iteration follows
    /// registration order.
    index: IndexMap<String, PrdId>,
}

impl DependencyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        DependencyStore {
            graph: StableGraph::default(),
            index: IndexMap::new(),
        }
    }

    /// Registers a PRD under `key`.
    ///
    /// Idempotent: returns `(id, true)` when a new node was created, or
    /// `(existing_id, false)` when the key was already registered.
    pub fn register_node(&mut self, key: &str) -> (PrdId, bool) {
        if let Some(&id) = self.index.get(key) {
            return (id, false);
        }
        let idx = self.graph.add_node(PrdNode {
            key: key.to_string(),
        });
        let id = PrdId::from(idx);
        self.index.insert(key.to_string(), id);
        (id, true)
    }

    /// Returns whether `key` is registered.
    pub fn has_node(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Resolves a key to its dense id.
    pub fn resolve(&self, key: &str) -> Option<PrdId> {
        self.index.get(key).copied()
    }

    /// The key registered for `id`. Panics on an id that was never
    /// handed out by this store.
    pub fn key_of(&self, id: PrdId) -> &str {
        &self.graph[petgraph::graph::NodeIndex::from(id)].key
    }

    /// Low-level edge insertion with no cycle check.
    ///
    /// Only ever called after the cycle detector has approved the edge
    /// (or when replaying persisted edges, where the validator audits the
    /// result instead). Committing an existing edge is a no-op; returns
    /// whether the edge set actually grew.
    pub fn commit_edge(&mut self, from: PrdId, to: PrdId) -> bool {
        if self.has_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from.into(), to.into(), DepEdge);
        true
    }

    /// Returns whether the exact edge (from, to) is committed.
    pub fn has_edge(&self, from: PrdId, to: PrdId) -> bool {
        self.graph.find_edge(from.into(), to.into()).is_some()
    }

    /// Successors of a node: the PRDs that must wait for `id`.
    pub fn successors(&self, id: PrdId) -> impl Iterator<Item = PrdId> + '_ {
        self.graph
            .neighbors_directed(id.into(), Direction::Outgoing)
            .map(PrdId::from)
    }

    /// Predecessors of a node: the PRDs `id` waits for.
    pub fn predecessors(&self, id: PrdId) -> impl Iterator<Item = PrdId> + '_ {
        self.graph
            .neighbors_directed(id.into(), Direction::Incoming)
            .map(PrdId::from)
    }

    /// Number of committed edges into `id`.
    pub fn in_degree(&self, id: PrdId) -> usize {
        self.predecessors(id).count()
    }

    /// Number of committed edges out of `id`.
    pub fn out_degree(&self, id: PrdId) -> usize {
        self.successors(id).count()
    }

    /// All node ids, dense and ascending (registration order).
    pub fn node_ids(&self) -> impl Iterator<Item = PrdId> + '_ {
        self.graph.node_indices().map(PrdId::from)
    }

    /// All registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// All committed edges in commit order.
    pub fn edges(&self) -> impl Iterator<Item = (PrdId, PrdId)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (PrdId::from(e.source()), PrdId::from(e.target())))
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of committed edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether no node has ever been registered.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

impl Default for DependencyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let mut store = DependencyStore::new();
        let (a1, created) = store.register_node("A");
        assert!(created);
        let (a2, created) = store.register_node("A");
        assert!(!created);
        assert_eq!(a1, a2);
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn ids_are_dense_in_registration_order() {
        let mut store = DependencyStore::new();
        let (a, _) = store.register_node("A");
        let (b, _) = store.register_node("B");
        let (c, _) = store.register_node("C");
        assert_eq!((a, b, c), (PrdId(0), PrdId(1), PrdId(2)));
        assert_eq!(store.key_of(b), "B");
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn duplicate_commit_is_noop() {
        let mut store = DependencyStore::new();
        let (a, _) = store.register_node("A");
        let (b, _) = store.register_node("B");
        assert!(store.commit_edge(a, b));
        assert!(!store.commit_edge(a, b));
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn adjacency_queries() {
        let mut store = DependencyStore::new();
        let (a, _) = store.register_node("A");
        let (b, _) = store.register_node("B");
        let (c, _) = store.register_node("C");
        store.commit_edge(a, c);
        store.commit_edge(b, c);

        let mut preds: Vec<PrdId> = store.predecessors(c).collect();
        preds.sort();
        assert_eq!(preds, vec![a, b]);
        assert_eq!(store.in_degree(c), 2);
        assert_eq!(store.out_degree(c), 0);
        assert_eq!(store.successors(a).collect::<Vec<_>>(), vec![c]);
        assert!(store.has_edge(a, c));
        assert!(!store.has_edge(c, a));
    }

    #[test]
    fn edges_listed_in_commit_order() {
        let mut store = DependencyStore::new();
        let (a, _) = store.register_node("A");
        let (b, _) = store.register_node("B");
        let (c, _) = store.register_node("C");
        store.commit_edge(b, c);
        store.commit_edge(a, b);
        assert_eq!(store.edges().collect::<Vec<_>>(), vec![(b, c), (a, b)]);
    }

    #[test]
    fn serde_roundtrip() {
        let mut store = DependencyStore::new();
        let (a, _) = store.register_node("A");
        let (b, _) = store.register_node("B");
        store.commit_edge(a, b);

        let json = serde_json::to_string(&store).unwrap();
        let back: DependencyStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node_count(), 2);
        assert_eq!(back.edge_count(), 1);
        assert_eq!(back.resolve("B"), Some(b));
        assert!(back.has_edge(a, b));
    }
}
