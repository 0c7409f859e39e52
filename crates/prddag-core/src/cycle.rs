//! Cycle detection over the committed edge set.
//!
//! Two duties, two call sites:
//! - [`would_create_cycle`] / [`find_cycle_path`] run on every edge
//!   proposal before the store commits it. The check is a bounded DFS
//!   from the proposed target looking for the proposed source; if that
//!   path exists, the new edge would close a loop. O(V+E).
//! - [`strongly_connected_components`] is the full Tarjan decomposition,
//!   used by the validator to audit externally-persisted edges. It never
//!   runs on the normal insertion path, which is
//!   cycle-free by construction.
//!
//! All traversals use an explicit work stack rather than call-stack
//! recursion, so adversarially long dependency chains cannot overflow
//! the stack.

use smallvec::SmallVec;

use crate::id::PrdId;
use crate::store::DependencyStore;

/// Sentinel discovery index for nodes Tarjan has not visited yet.
const UNVISITED: u32 = u32::MAX;

/// True iff `to` can already reach `from` via committed edges, in which
/// case adding `from -> to` would close a loop. Also true for
/// `from == to`.
pub fn would_create_cycle(store: &DependencyStore, from: PrdId, to: PrdId) -> bool {
    if from == to {
        return true;
    }
    let n = store.node_count();
    let mut visited = vec![false; n];
    let mut stack: Vec<PrdId> = vec![to];
    while let Some(v) = stack.pop() {
        if v == from {
            return true;
        }
        if visited[v.index()] {
            continue;
        }
        visited[v.index()] = true;
        for succ in store.successors(v) {
            if !visited[succ.index()] {
                stack.push(succ);
            }
        }
    }
    false
}

/// Reconstructs the existing path `to -> ... -> from` that a proposed
/// edge `from -> to` would turn into a cycle.
///
/// Returns `None` when no such path exists (the proposal is safe). The
/// path comes from the parent pointers of the same DFS that
/// [`would_create_cycle`] performs; a self-proposal yields `[from]`.
pub fn find_cycle_path(store: &DependencyStore, from: PrdId, to: PrdId) -> Option<Vec<PrdId>> {
    if from == to {
        return Some(vec![from]);
    }
    let n = store.node_count();
    let mut visited = vec![false; n];
    let mut parent: Vec<Option<PrdId>> = vec![None; n];
    let mut stack: Vec<PrdId> = vec![to];
    visited[to.index()] = true;

    let mut found = false;
    while let Some(v) = stack.pop() {
        if v == from {
            found = true;
            break;
        }
        for succ in store.successors(v) {
            if !visited[succ.index()] {
                visited[succ.index()] = true;
                parent[succ.index()] = Some(v);
                stack.push(succ);
            }
        }
    }
    if !found {
        return None;
    }

    // Walk parents back from `from` to `to`, then flip.
    let mut path = vec![from];
    let mut cursor = from;
    while cursor != to {
        match parent[cursor.index()] {
            Some(p) => {
                path.push(p);
                cursor = p;
            }
            None => break,
        }
    }
    path.reverse();
    Some(path)
}

/// Full Tarjan decomposition into strongly connected components.
///
/// Any component with more than one member indicates an existing cycle;
/// so does a singleton whose node carries a self-edge (checked by the
/// validator separately). Iterative formulation with explicit
/// `(node, successor position)` frames.
pub fn strongly_connected_components(store: &DependencyStore) -> Vec<Vec<PrdId>> {
    let n = store.node_count();
    // Snapshot adjacency so frames can index successors by position.
    let adj: Vec<SmallVec<[PrdId; 4]>> = (0..n)
        .map(|i| store.successors(PrdId(i as u32)).collect())
        .collect();

    let mut discovery = vec![UNVISITED; n];
    let mut lowlink = vec![0u32; n];
    let mut on_stack = vec![false; n];
    let mut component_stack: Vec<usize> = Vec::new();
    let mut next_index = 0u32;
    let mut components: Vec<Vec<PrdId>> = Vec::new();
    // Work frames: (node, position of the next successor to examine).
    let mut work: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if discovery[root] != UNVISITED {
            continue;
        }
        work.push((root, 0));
        while let Some((v, pos)) = work.pop() {
            if pos == 0 {
                discovery[v] = next_index;
                lowlink[v] = next_index;
                next_index += 1;
                component_stack.push(v);
                on_stack[v] = true;
            } else {
                // Just returned from the child at pos - 1.
                let child = adj[v][pos - 1].index();
                lowlink[v] = lowlink[v].min(lowlink[child]);
            }

            let mut descended = false;
            let mut i = pos;
            while i < adj[v].len() {
                let w = adj[v][i].index();
                if discovery[w] == UNVISITED {
                    work.push((v, i + 1));
                    work.push((w, 0));
                    descended = true;
                    break;
                }
                if on_stack[w] {
                    lowlink[v] = lowlink[v].min(discovery[w]);
                }
                i += 1;
            }
            if descended {
                continue;
            }

            if lowlink[v] == discovery[v] {
                let mut component = Vec::new();
                while let Some(w) = component_stack.pop() {
                    on_stack[w] = false;
                    component.push(PrdId(w as u32));
                    if w == v {
                        break;
                    }
                }
                component.sort();
                components.push(component);
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(edges: &[(&str, &str)]) -> DependencyStore {
        let mut store = DependencyStore::new();
        for (from, to) in edges {
            store.register_node(from);
            store.register_node(to);
        }
        for (from, to) in edges {
            let f = store.resolve(from).unwrap();
            let t = store.resolve(to).unwrap();
            store.commit_edge(f, t);
        }
        store
    }

    #[test]
    fn reverse_edge_would_cycle() {
        let store = store_with(&[("A", "B")]);
        let a = store.resolve("A").unwrap();
        let b = store.resolve("B").unwrap();
        assert!(would_create_cycle(&store, b, a));
        assert!(!would_create_cycle(&store, a, b));
    }

    #[test]
    fn self_edge_would_cycle() {
        let store = store_with(&[("A", "B")]);
        let a = store.resolve("A").unwrap();
        assert!(would_create_cycle(&store, a, a));
        assert_eq!(find_cycle_path(&store, a, a), Some(vec![a]));
    }

    #[test]
    fn chain_closure_detected() {
        // A -> B -> C; proposing C -> A closes the loop.
        let store = store_with(&[("A", "B"), ("B", "C")]);
        let a = store.resolve("A").unwrap();
        let c = store.resolve("C").unwrap();
        assert!(would_create_cycle(&store, c, a));
    }

    #[test]
    fn cycle_path_runs_target_to_source() {
        let store = store_with(&[("A", "B"), ("B", "C")]);
        let a = store.resolve("A").unwrap();
        let b = store.resolve("B").unwrap();
        let c = store.resolve("C").unwrap();
        // Proposing C -> A: existing path A -> B -> C.
        let path = find_cycle_path(&store, c, a).unwrap();
        assert_eq!(path, vec![a, b, c]);
    }

    #[test]
    fn no_path_means_no_cycle() {
        let store = store_with(&[("A", "B"), ("C", "D")]);
        let a = store.resolve("A").unwrap();
        let c = store.resolve("C").unwrap();
        assert!(!would_create_cycle(&store, a, c));
        assert_eq!(find_cycle_path(&store, a, c), None);
    }

    #[test]
    fn diamond_is_acyclic() {
        let store = store_with(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let sccs = strongly_connected_components(&store);
        assert_eq!(sccs.len(), 4);
        assert!(sccs.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn tarjan_finds_committed_cycle() {
        // Raw commits can create cycles; Tarjan must surface them.
        let store = store_with(&[("A", "B"), ("B", "C"), ("C", "A"), ("C", "D")]);
        let sccs = strongly_connected_components(&store);
        let big: Vec<&Vec<PrdId>> = sccs.iter().filter(|c| c.len() > 1).collect();
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].len(), 3);
        let a = store.resolve("A").unwrap();
        let d = store.resolve("D").unwrap();
        assert!(big[0].contains(&a));
        assert!(!big[0].contains(&d));
    }

    #[test]
    fn tarjan_two_disjoint_cycles() {
        let store = store_with(&[("A", "B"), ("B", "A"), ("C", "D"), ("D", "C")]);
        let sccs = strongly_connected_components(&store);
        assert_eq!(sccs.iter().filter(|c| c.len() == 2).count(), 2);
    }

    #[test]
    fn long_chain_does_not_overflow() {
        // 50k-node chain; recursion would blow the call stack here.
        let mut store = DependencyStore::new();
        let n = 50_000u32;
        for i in 0..n {
            store.register_node(&format!("n{i}"));
        }
        for i in 0..n - 1 {
            store.commit_edge(PrdId(i), PrdId(i + 1));
        }
        let first = PrdId(0);
        let last = PrdId(n - 1);
        assert!(would_create_cycle(&store, last, first));
        let path = find_cycle_path(&store, last, first).unwrap();
        assert_eq!(path.len(), n as usize);
        let sccs = strongly_connected_components(&store);
        assert_eq!(sccs.len(), n as usize);
    }
}
