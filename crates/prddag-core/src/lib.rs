//! Dependency DAG engine for roadmap decomposition.
//!
//! prddag-core registers discrete work units (PRDs), accepts proposed
//! must-complete-before relationships one at a time, keeps the graph
//! provably acyclic at every observable point, and derives a valid
//! execution order plus batches of units safe to run concurrently.
//!
//! [`DecompositionSession`] is the single entry point: every edge
//! proposal passes the cycle detector before the store commits it and
//! the incremental orderer repairs the topological sequence. The
//! validator and batch grouper are read-only views computed on demand.
//!
//! # Modules
//!
//! - [`id`]: dense [`PrdId`] newtype over the petgraph node index
//! - [`error`]: [`GraphError`] with all failure modes
//! - [`store`]: canonical node/edge storage, no algorithmic logic
//! - [`cycle`]: insertion-path reachability check plus the Tarjan audit
//! - [`order`]: incremental topological ordering with local repair
//! - [`batches`]: depth-levelled concurrency-safe groups
//! - [`validate`]: CYCLE / ORPHAN / DEEP_CHAIN diagnostics
//! - [`session`]: the owning façade and lifecycle state machine
//! - [`snapshot`]: the flat persisted form (nodes and edges only)

pub mod batches;
pub mod cycle;
pub mod error;
pub mod id;
pub mod order;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod validate;

// Re-export the public surface for ergonomic use.
pub use error::GraphError;
pub use id::PrdId;
pub use order::IncrementalOrder;
pub use session::{DecompositionSession, SessionState};
pub use snapshot::GraphSnapshot;
pub use store::DependencyStore;
pub use validate::{GraphValidator, Issue, IssueKind, Severity, DEFAULT_DEEP_CHAIN_THRESHOLD};
