//! Concurrency-safe batch derivation.
//!
//! A node's depth is 0 when it has no predecessors, else one more than
//! the deepest predecessor. Nodes sharing a depth form one batch; batches
//! come back ordered by increasing depth. Concatenating them yields a
//! sequence consistent with the topological invariant, and no two nodes
//! inside one batch have a path between them, so a batch is safe to run
//! concurrently. The grouping is conservative: it finds a safe schedule,
//! not every possible one.
//!
//! Recomputed on demand from the committed edge set. Callers wanting it
//! per-insertion should memoize and invalidate on the next successful
//! commit. Nodes inside a persisted cycle never reach depth 0 and are
//! omitted, matching their exclusion from the execution order.

use crate::id::PrdId;
use crate::store::DependencyStore;

/// Partitions nodes into depth-levelled batches.
pub fn parallel_batches(store: &DependencyStore) -> Vec<Vec<PrdId>> {
    let n = store.node_count();
    let mut indegree: Vec<usize> = (0..n)
        .map(|i| store.in_degree(PrdId(i as u32)))
        .collect();

    let mut current: Vec<PrdId> = (0..n)
        .map(|i| PrdId(i as u32))
        .filter(|id| indegree[id.index()] == 0)
        .collect();

    let mut batches = Vec::new();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &u in &current {
            for v in store.successors(u) {
                indegree[v.index()] -= 1;
                if indegree[v.index()] == 0 {
                    next.push(v);
                }
            }
        }
        // Registration order within each batch.
        next.sort();
        batches.push(std::mem::replace(&mut current, next));
    }
    batches
}
