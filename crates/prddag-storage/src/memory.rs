//! In-memory implementation of [`SessionStore`].
//!
//! First-class backend for tests and ephemeral sessions. Semantics are
//! identical to the SQLite backend: insertion order is preserved and
//! edges may only reference persisted nodes.

use std::collections::HashMap;

use prddag_core::GraphSnapshot;

use crate::error::StorageError;
use crate::traits::SessionStore;
use crate::types::{SessionId, SessionSummary};

/// Data stored for a single session.
#[derive(Debug, Clone)]
struct StoredSession {
    name: String,
    snapshot: GraphSnapshot,
}

/// In-memory implementation of [`SessionStore`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: HashMap<i64, StoredSession>,
    next_id: i64,
}

impl InMemorySessionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        InMemorySessionStore {
            sessions: HashMap::new(),
            next_id: 1,
        }
    }

    fn get(&self, id: SessionId) -> Result<&StoredSession, StorageError> {
        self.sessions
            .get(&id.0)
            .ok_or(StorageError::SessionNotFound(id.0))
    }

    fn get_mut(&mut self, id: SessionId) -> Result<&mut StoredSession, StorageError> {
        self.sessions
            .get_mut(&id.0)
            .ok_or(StorageError::SessionNotFound(id.0))
    }
}

impl SessionStore for InMemorySessionStore {
    fn create_session(&mut self, name: &str) -> Result<SessionId, StorageError> {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(
            id.0,
            StoredSession {
                name: name.to_string(),
                snapshot: GraphSnapshot::new(),
            },
        );
        Ok(id)
    }

    fn delete_session(&mut self, id: SessionId) -> Result<(), StorageError> {
        self.sessions
            .remove(&id.0)
            .ok_or(StorageError::SessionNotFound(id.0))?;
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<SessionSummary>, StorageError> {
        let mut summaries: Vec<SessionSummary> = self
            .sessions
            .iter()
            .map(|(&id, stored)| SessionSummary {
                id: SessionId(id),
                name: stored.name.clone(),
            })
            .collect();
        summaries.sort_by_key(|s| s.id.0);
        Ok(summaries)
    }

    fn save_snapshot(
        &mut self,
        id: SessionId,
        snapshot: &GraphSnapshot,
    ) -> Result<(), StorageError> {
        self.get_mut(id)?.snapshot = snapshot.clone();
        Ok(())
    }

    fn load_snapshot(&self, id: SessionId) -> Result<GraphSnapshot, StorageError> {
        Ok(self.get(id)?.snapshot.clone())
    }

    fn insert_node(&mut self, id: SessionId, key: &str) -> Result<(), StorageError> {
        let stored = self.get_mut(id)?;
        if !stored.snapshot.nodes.iter().any(|k| k == key) {
            stored.snapshot.nodes.push(key.to_string());
        }
        Ok(())
    }

    fn insert_edge(&mut self, id: SessionId, from: &str, to: &str) -> Result<(), StorageError> {
        let stored = self.get_mut(id)?;
        for key in [from, to] {
            if !stored.snapshot.nodes.iter().any(|k| k == key) {
                return Err(StorageError::Integrity {
                    reason: format!("edge references unpersisted node '{key}'"),
                });
            }
        }
        let pair = (from.to_string(), to.to_string());
        if !stored.snapshot.edges.contains(&pair) {
            stored.snapshot.edges.push(pair);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prddag_core::{DecompositionSession, IssueKind, SessionState};

    fn sample_session() -> DecompositionSession {
        let mut session = DecompositionSession::new();
        for id in ["auth", "api", "ui"] {
            session.register_prd(id);
        }
        session.propose_dependency("auth", "api").unwrap();
        session.propose_dependency("api", "ui").unwrap();
        session
    }

    #[test]
    fn create_save_load_roundtrip() {
        let mut store = InMemorySessionStore::new();
        let session = sample_session();

        let id = store.create_session("roadmap").unwrap();
        store.save_session(id, &session).unwrap();

        let loaded = store.load_session(id).unwrap();
        assert_eq!(loaded.prd_count(), 3);
        assert_eq!(loaded.dependency_count(), 2);
        assert_eq!(loaded.execution_order(), vec!["auth", "api", "ui"]);
    }

    #[test]
    fn list_sessions_sorted_by_id() {
        let mut store = InMemorySessionStore::new();
        store.create_session("alpha").unwrap();
        store.create_session("beta").unwrap();

        let list = store.list_sessions().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "alpha");
        assert_eq!(list[1].name, "beta");
        assert_eq!(list[0].id, SessionId(1));
    }

    #[test]
    fn delete_then_load_fails() {
        let mut store = InMemorySessionStore::new();
        let id = store.create_session("doomed").unwrap();
        store.delete_session(id).unwrap();

        match store.load_snapshot(id) {
            Err(StorageError::SessionNotFound(sid)) => assert_eq!(sid, id.0),
            other => panic!("expected SessionNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn incremental_appends_reconstruct_the_session() {
        let mut store = InMemorySessionStore::new();
        let id = store.create_session("incremental").unwrap();

        for key in ["a", "b", "c"] {
            store.insert_node(id, key).unwrap();
        }
        store.insert_edge(id, "a", "b").unwrap();
        store.insert_edge(id, "b", "c").unwrap();
        // Idempotent replays.
        store.insert_node(id, "a").unwrap();
        store.insert_edge(id, "a", "b").unwrap();

        let loaded = store.load_session(id).unwrap();
        assert_eq!(loaded.execution_order(), vec!["a", "b", "c"]);
        assert_eq!(loaded.dependency_count(), 2);
        assert_eq!(loaded.state(), SessionState::Building);
    }

    #[test]
    fn edge_to_unpersisted_node_is_rejected() {
        let mut store = InMemorySessionStore::new();
        let id = store.create_session("strict").unwrap();
        store.insert_node(id, "a").unwrap();

        match store.insert_edge(id, "a", "ghost") {
            Err(StorageError::Integrity { reason }) => assert!(reason.contains("ghost")),
            other => panic!("expected Integrity error, got: {other:?}"),
        }
    }

    #[test]
    fn externally_mutated_edges_still_load() {
        let mut store = InMemorySessionStore::new();
        let id = store.create_session("tampered").unwrap();
        // Simulates an external writer committing a cycle behind the
        // engine's back.
        store
            .save_snapshot(
                id,
                &GraphSnapshot {
                    nodes: vec!["a".into(), "b".into(), "c".into()],
                    edges: vec![("a".into(), "b".into()), ("b".into(), "a".into())],
                },
            )
            .unwrap();

        let mut loaded = store.load_session(id).unwrap();
        assert_eq!(loaded.execution_order(), vec!["c"]);
        let issues = loaded.diagnostics();
        assert!(issues.iter().any(|i| i.kind == IssueKind::Cycle && i.is_error()));
    }
}
