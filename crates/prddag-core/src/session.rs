//! DecompositionSession: the single entry point for one dependency graph.
//!
//! A session owns the store, the incremental ordering, and the validator
//! configuration for one roadmap decomposition. All mutations go through
//! session methods so the acyclicity invariant holds at every observable
//! point: a proposal passes the cycle detector before the store commits
//! it and the ordering repairs itself, atomically from the caller's view.
//!
//! The engine is in-memory, synchronous, and deterministic. Mutations
//! take `&mut self` and reads take `&self`, so the single-writer model
//! of the design is enforced by ownership; callers sharing a session
//! across threads wrap it in a reader/writer lock themselves.

use serde::{Deserialize, Serialize};

use crate::batches;
use crate::cycle;
use crate::error::GraphError;
use crate::order::IncrementalOrder;
use crate::snapshot::GraphSnapshot;
use crate::store::DependencyStore;
use crate::validate::{GraphValidator, Issue};

/// Lifecycle of a session's graph.
///
/// `Empty` until the first mutation, `Building` while mutating,
/// `Validated` once diagnostics report zero errors. Any later mutation
/// drops back to `Building`; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Empty,
    Building,
    Validated,
}

/// One decomposition session owning one dependency graph.
#[derive(Debug, Clone)]
pub struct DecompositionSession {
    store: DependencyStore,
    order: IncrementalOrder,
    validator: GraphValidator,
    state: SessionState,
}

impl DecompositionSession {
    /// Creates an empty session with the default validator configuration.
    pub fn new() -> Self {
        DecompositionSession {
            store: DependencyStore::new(),
            order: IncrementalOrder::new(),
            validator: GraphValidator::default(),
            state: SessionState::Empty,
        }
    }

    /// Creates an empty session with a non-default deep-chain threshold.
    pub fn with_deep_chain_threshold(threshold: usize) -> Self {
        DecompositionSession {
            validator: GraphValidator::with_threshold(threshold),
            ..Self::new()
        }
    }

    /// Registers a PRD. Returns whether a new node was created;
    /// re-registering an existing id is a no-op returning `false`.
    pub fn register_prd(&mut self, id: &str) -> bool {
        let (prd, created) = self.store.register_node(id);
        if created {
            self.order.push_node(prd);
            self.state = SessionState::Building;
        }
        created
    }

    /// Whether `id` is registered.
    pub fn has_prd(&self, id: &str) -> bool {
        self.store.has_node(id)
    }

    /// Proposes a "from must complete before to" dependency.
    ///
    /// Either fully succeeds (cycle check, commit, and ordering repair
    /// all advance together, returning whether the ordering actually
    /// moved) or fully fails with no side effect:
    /// - [`GraphError::UnknownNode`] when either id is unregistered;
    /// - [`GraphError::CycleDetected`] when the edge would close a loop,
    ///   carrying the would-be cycle path for diagnosis.
    ///
    /// Re-proposing a committed edge is a no-op returning `Ok(false)`.
    pub fn propose_dependency(&mut self, from: &str, to: &str) -> Result<bool, GraphError> {
        let from_id = self
            .store
            .resolve(from)
            .ok_or_else(|| GraphError::UnknownNode { id: from.to_string() })?;
        let to_id = self
            .store
            .resolve(to)
            .ok_or_else(|| GraphError::UnknownNode { id: to.to_string() })?;

        if self.store.has_edge(from_id, to_id) {
            return Ok(false);
        }
        if cycle::would_create_cycle(&self.store, from_id, to_id) {
            // The existing path runs to -> ... -> from; rotate it so the
            // reported cycle starts at the proposed source.
            let Some(existing) = cycle::find_cycle_path(&self.store, from_id, to_id) else {
                return Err(GraphError::Inconsistency {
                    reason: "reachable target produced no cycle path".to_string(),
                });
            };
            let mut path = Vec::with_capacity(existing.len());
            path.push(from.to_string());
            for &id in &existing {
                if id != from_id {
                    path.push(self.store.key_of(id).to_string());
                }
            }
            return Err(GraphError::CycleDetected { path });
        }

        self.store.commit_edge(from_id, to_id);
        let reordered = self.order.apply_edge(&self.store, from_id, to_id)?;
        #[cfg(debug_assertions)]
        self.order.assert_consistent(&self.store);
        self.state = SessionState::Building;
        Ok(reordered)
    }

    /// A valid execution order: every orderable PRD exactly once, each
    /// dependency before its dependents. Nodes caught in a persisted
    /// cycle are excluded and flagged by [`Self::diagnostics`].
    pub fn execution_order(&self) -> Vec<String> {
        self.order
            .sequence()
            .iter()
            .map(|&id| self.store.key_of(id).to_string())
            .collect()
    }

    /// Concurrency-safe batches ordered by dependency depth. Recomputed
    /// from the committed edge set on every call; memoize upstream if
    /// needed per-insertion.
    pub fn parallel_batches(&self) -> Vec<Vec<String>> {
        batches::parallel_batches(&self.store)
            .into_iter()
            .map(|batch| {
                batch
                    .into_iter()
                    .map(|id| self.store.key_of(id).to_string())
                    .collect()
            })
            .collect()
    }

    /// Runs whole-graph diagnostics. Never fails; returns issue data for
    /// the caller to act on. Reporting zero errors moves a `Building`
    /// session to `Validated`.
    pub fn diagnostics(&mut self) -> Vec<Issue> {
        let issues = self.validator.validate(&self.store);
        if self.state == SessionState::Building && !issues.iter().any(Issue::is_error) {
            self.state = SessionState::Validated;
        }
        issues
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of registered PRDs.
    pub fn prd_count(&self) -> usize {
        self.store.node_count()
    }

    /// Number of committed dependencies.
    pub fn dependency_count(&self) -> usize {
        self.store.edge_count()
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &DependencyStore {
        &self.store
    }

    /// The persistable state: flat node and edge lists, nothing derived.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.store.keys().map(str::to_string).collect(),
            edges: self
                .store
                .edges()
                .map(|(f, t)| {
                    (
                        self.store.key_of(f).to_string(),
                        self.store.key_of(t).to_string(),
                    )
                })
                .collect(),
        }
    }

    /// Reconstructs a session from persisted state.
    ///
    /// Edges are replayed without the insertion-path cycle check: the
    /// snapshot may have been mutated externally, and the engine keeps
    /// operating on corrupted state rather than refusing to load it.
    /// Cyclic nodes are excluded from the ordering and surface as
    /// ERROR-severity diagnostics. An edge naming an unregistered id
    /// does fail the load, since nothing sensible can be rebuilt from it.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, GraphError> {
        let mut store = DependencyStore::new();
        for key in &snapshot.nodes {
            store.register_node(key);
        }
        for (from, to) in &snapshot.edges {
            let from_id = store
                .resolve(from)
                .ok_or_else(|| GraphError::UnknownNode { id: from.clone() })?;
            let to_id = store
                .resolve(to)
                .ok_or_else(|| GraphError::UnknownNode { id: to.clone() })?;
            store.commit_edge(from_id, to_id);
        }
        let mut order = IncrementalOrder::new();
        order.rebuild(&store);
        let state = if store.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Building
        };
        Ok(DecompositionSession {
            store,
            order,
            validator: GraphValidator::default(),
            state,
        })
    }
}

impl Default for DecompositionSession {
    fn default() -> Self {
        Self::new()
    }
}
