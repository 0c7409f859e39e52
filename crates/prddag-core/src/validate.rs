//! Whole-graph health diagnostics.
//!
//! [`GraphValidator::validate`] produces a structured issue list on
//! demand; it never runs on the mutation path and never fails. The graph
//! is healthy when no ERROR-severity issue is present.
//!
//! Three checks:
//! - **CYCLE** (error): a strongly connected component of size > 1, or a
//!   self-edge. Unreachable through the session API, which cycle-checks
//!   every proposal; this audit guards state loaded from external
//!   persistence, where the edge list may have been mutated behind the
//!   engine's back. Nodes downstream of a cycle can never be scheduled
//!   either, so they are named in a second CYCLE issue: everything
//!   missing from the execution order is accounted for here.
//! - **ORPHAN** (warning): a node with zero incoming and zero outgoing
//!   edges, flagged for human review as a possibly-unnecessary unit.
//! - **DEEP_CHAIN** (warning): the longest dependency chain exceeds a
//!   configurable threshold, a sign the decomposition is too sequential.

use serde::{Deserialize, Serialize};

use crate::cycle::strongly_connected_components;
use crate::id::PrdId;
use crate::store::DependencyStore;

/// Default longest-chain threshold (in nodes) before DEEP_CHAIN fires.
pub const DEFAULT_DEEP_CHAIN_THRESHOLD: usize = 5;

/// How severe an issue is. Only `Error` blocks the healthy verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
}

/// The category of a graph-health issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    Cycle,
    Orphan,
    DeepChain,
}

/// One graph-health finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// The PRD keys involved, in a kind-specific order (cycle members
    /// ascending by registration, chain members in path order).
    pub nodes: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// Whether this issue blocks the healthy verdict.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Runs whole-graph diagnostics against a [`DependencyStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphValidator {
    /// Longest chain length (in nodes) tolerated before DEEP_CHAIN fires.
    pub deep_chain_threshold: usize,
}

impl Default for GraphValidator {
    fn default() -> Self {
        GraphValidator {
            deep_chain_threshold: DEFAULT_DEEP_CHAIN_THRESHOLD,
        }
    }
}

impl GraphValidator {
    /// A validator with a non-default chain threshold.
    pub fn with_threshold(deep_chain_threshold: usize) -> Self {
        GraphValidator {
            deep_chain_threshold,
        }
    }

    /// Produces the full issue list for the current graph.
    pub fn validate(&self, store: &DependencyStore) -> Vec<Issue> {
        let mut issues = Vec::new();
        self.check_cycles(store, &mut issues);
        self.check_orphans(store, &mut issues);
        self.check_deep_chain(store, &mut issues);
        issues
    }

    fn check_cycles(&self, store: &DependencyStore, issues: &mut Vec<Issue>) {
        let n = store.node_count();
        let mut in_cycle = vec![false; n];
        for component in strongly_connected_components(store) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&v| store.has_edge(v, v));
            if !cyclic {
                continue;
            }
            for &id in &component {
                in_cycle[id.index()] = true;
            }
            let nodes: Vec<String> = component
                .iter()
                .map(|&id| store.key_of(id).to_string())
                .collect();
            let message = format!(
                "corrupted state: {} unit(s) form a dependency cycle: {}",
                nodes.len(),
                nodes.join(", ")
            );
            issues.push(Issue {
                kind: IssueKind::Cycle,
                severity: Severity::Error,
                nodes,
                message,
            });
        }

        // Anything reachable from a cycle member is unschedulable too:
        // its in-degree never drains, so the orderer leaves it out of
        // the sequence. Name those nodes so nothing drops out silently.
        let mut blocked = vec![false; n];
        let mut stack: Vec<PrdId> = (0..n)
            .map(|i| PrdId(i as u32))
            .filter(|id| in_cycle[id.index()])
            .collect();
        while let Some(v) = stack.pop() {
            for succ in store.successors(v) {
                if !in_cycle[succ.index()] && !blocked[succ.index()] {
                    blocked[succ.index()] = true;
                    stack.push(succ);
                }
            }
        }
        let nodes: Vec<String> = (0..n)
            .filter(|&i| blocked[i])
            .map(|i| store.key_of(PrdId(i as u32)).to_string())
            .collect();
        if !nodes.is_empty() {
            let message = format!(
                "{} unit(s) depend on a cycle and cannot be scheduled: {}",
                nodes.len(),
                nodes.join(", ")
            );
            issues.push(Issue {
                kind: IssueKind::Cycle,
                severity: Severity::Error,
                nodes,
                message,
            });
        }
    }

    fn check_orphans(&self, store: &DependencyStore, issues: &mut Vec<Issue>) {
        for id in store.node_ids() {
            if store.in_degree(id) == 0 && store.out_degree(id) == 0 {
                let key = store.key_of(id).to_string();
                let message = format!(
                    "PRD '{key}' has no dependency in either direction; review whether it belongs in this decomposition"
                );
                issues.push(Issue {
                    kind: IssueKind::Orphan,
                    severity: Severity::Warning,
                    nodes: vec![key],
                    message,
                });
            }
        }
    }

    /// Longest-path DP over a topological pass. Nodes inside a cycle
    /// never become ready and simply drop out of the measurement; the
    /// cycle check already reports them.
    fn check_deep_chain(&self, store: &DependencyStore, issues: &mut Vec<Issue>) {
        let n = store.node_count();
        let mut indegree: Vec<usize> = (0..n)
            .map(|i| store.in_degree(PrdId(i as u32)))
            .collect();
        let mut ready: Vec<PrdId> = (0..n)
            .map(|i| PrdId(i as u32))
            .filter(|id| indegree[id.index()] == 0)
            .collect();

        // chain_len[v]: nodes on the longest path ending at v.
        let mut chain_len = vec![1usize; n];
        let mut chain_parent: Vec<Option<PrdId>> = vec![None; n];
        let mut topo: Vec<PrdId> = Vec::with_capacity(n);
        while let Some(v) = ready.pop() {
            topo.push(v);
            for succ in store.successors(v) {
                if chain_len[v.index()] + 1 > chain_len[succ.index()] {
                    chain_len[succ.index()] = chain_len[v.index()] + 1;
                    chain_parent[succ.index()] = Some(v);
                }
                indegree[succ.index()] -= 1;
                if indegree[succ.index()] == 0 {
                    ready.push(succ);
                }
            }
        }

        let Some(&deepest) = topo.iter().max_by_key(|id| chain_len[id.index()]) else {
            return;
        };
        let longest = chain_len[deepest.index()];
        if longest <= self.deep_chain_threshold {
            return;
        }

        // Reconstruct the chain front to back.
        let mut path = vec![deepest];
        let mut cursor = deepest;
        while let Some(p) = chain_parent[cursor.index()] {
            path.push(p);
            cursor = p;
        }
        path.reverse();
        let nodes: Vec<String> = path
            .iter()
            .map(|&id| store.key_of(id).to_string())
            .collect();
        let message = format!(
            "longest dependency chain has {longest} units (threshold {}): {}",
            self.deep_chain_threshold,
            nodes.join(" -> ")
        );
        issues.push(Issue {
            kind: IssueKind::DeepChain,
            severity: Severity::Warning,
            nodes,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(keys: &[&str], edges: &[(&str, &str)]) -> DependencyStore {
        let mut store = DependencyStore::new();
        for key in keys {
            store.register_node(key);
        }
        for (from, to) in edges {
            let f = store.resolve(from).unwrap();
            let t = store.resolve(to).unwrap();
            store.commit_edge(f, t);
        }
        store
    }

    #[test]
    fn healthy_graph_has_no_issues() {
        let store = build(&["A", "B", "C"], &[("A", "B"), ("A", "C")]);
        let issues = GraphValidator::default().validate(&store);
        assert!(issues.is_empty());
    }

    #[test]
    fn orphan_is_a_warning() {
        let store = build(&["A", "B", "X"], &[("A", "B")]);
        let issues = GraphValidator::default().validate(&store);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Orphan);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].nodes, vec!["X"]);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn committed_cycle_is_an_error() {
        let store = build(&["A", "B", "C"], &[("A", "B"), ("B", "A"), ("A", "C")]);
        let issues = GraphValidator::default().validate(&store);
        let cycles: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::Cycle)
            .collect();
        // One issue for the cycle members, one for C downstream of it.
        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().all(|i| i.is_error()));
        assert_eq!(cycles[0].nodes, vec!["A", "B"]);
        assert_eq!(cycles[1].nodes, vec!["C"]);
    }

    #[test]
    fn cycle_descendants_are_flagged() {
        // A <-> B with a chain hanging off it: C and D can never run.
        let store = build(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "A"), ("B", "C"), ("C", "D")],
        );
        let issues = GraphValidator::default().validate(&store);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].nodes, vec!["A", "B"]);
        assert_eq!(issues[1].nodes, vec!["C", "D"]);
        assert!(issues[1].is_error());
        assert!(issues[1].message.contains("cannot be scheduled"));
    }

    #[test]
    fn self_edge_is_an_error() {
        let store = build(&["A", "B"], &[("A", "A"), ("A", "B")]);
        let issues = GraphValidator::default().validate(&store);
        let cycle = issues.iter().find(|i| i.kind == IssueKind::Cycle).unwrap();
        assert_eq!(cycle.nodes, vec!["A"]);
        assert!(cycle.is_error());
    }

    #[test]
    fn chain_of_seven_exceeds_default_threshold() {
        let keys: Vec<String> = (1..=7).map(|i| format!("A{i}")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = refs.windows(2).map(|w| (w[0], w[1])).collect();
        let store = build(&refs, &edges);

        let issues = GraphValidator::default().validate(&store);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DeepChain);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].nodes, refs);
        assert!(issues[0].message.contains("7 units"));
    }

    #[test]
    fn chain_at_threshold_passes() {
        let store = build(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E")],
        );
        let issues = GraphValidator::default().validate(&store);
        assert!(issues.is_empty());
    }

    #[test]
    fn custom_threshold() {
        let store = build(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let issues = GraphValidator::with_threshold(2).validate(&store);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DeepChain);
        assert_eq!(issues[0].nodes, vec!["A", "B", "C"]);
    }

    #[test]
    fn issue_serializes_with_screaming_tags() {
        let store = build(&["X"], &[]);
        let issues = GraphValidator::default().validate(&store);
        let json = serde_json::to_string(&issues[0]).unwrap();
        assert!(json.contains("\"ORPHAN\""));
        assert!(json.contains("\"WARNING\""));
    }
}
