//! Core error types for prddag-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Every
//! proposal outcome is a tagged result: the orchestration layer above the
//! engine decides whether and how to retry a rejected dependency, so no
//! variant here is used for control flow.

use thiserror::Error;

/// Errors produced by mutating operations on the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge proposal referenced a PRD id that was never registered.
    /// Recoverable: register the node first, then re-propose.
    #[error("unknown PRD id: '{id}'")]
    UnknownNode { id: String },

    /// The proposed edge would close a cycle. The graph is unchanged.
    ///
    /// `path` is the would-be cycle starting at the proposed edge's
    /// source, each node listed once: proposing `B -> A` over a
    /// committed `A -> B` yields `["B", "A"]`.
    #[error("dependency would create a cycle: {}", format_cycle(path))]
    CycleDetected { path: Vec<String> },

    /// An internal invariant did not hold. Unreachable through the
    /// normal API; guards the local-reorder contract.
    #[error("graph inconsistency: {reason}")]
    Inconsistency { reason: String },
}

fn format_cycle(path: &[String]) -> String {
    match path.first() {
        Some(first) => {
            let mut s = path.join(" -> ");
            s.push_str(" -> ");
            s.push_str(first);
            s
        }
        None => String::from("(empty path)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_node_display() {
        let err = GraphError::UnknownNode { id: "auth".into() };
        assert_eq!(err.to_string(), "unknown PRD id: 'auth'");
    }

    #[test]
    fn cycle_display_closes_the_loop() {
        let err = GraphError::CycleDetected {
            path: vec!["B".into(), "A".into()],
        };
        assert_eq!(
            err.to_string(),
            "dependency would create a cycle: B -> A -> B"
        );
    }

    #[test]
    fn self_loop_display() {
        let err = GraphError::CycleDetected {
            path: vec!["A".into()],
        };
        assert_eq!(err.to_string(), "dependency would create a cycle: A -> A");
    }
}
