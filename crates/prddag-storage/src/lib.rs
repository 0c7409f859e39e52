//! Storage abstraction for PRD decomposition sessions.
//!
//! Provides the [`SessionStore`] trait defining the storage contract that
//! all backends implement, plus [`InMemorySessionStore`] and
//! [`SqliteSessionStore`] as first-class backends.
//!
//! # Architecture
//!
//! The storage layer has a two-layer API:
//! - **Low-level append** methods (`insert_node`, `insert_edge`) serve as
//!   the incremental save mechanism, one call per accepted mutation.
//! - **High-level convenience** methods (`save_session`, `load_session`)
//!   provide bulk operations through the engine's [`GraphSnapshot`] form.
//!
//! Only the flat node and edge lists are persisted; execution order and
//! parallel batches are recomputed on load.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: SessionId, SessionSummary storage-layer types
//! - [`traits`]: SessionStore trait definition
//! - [`memory`]: InMemorySessionStore implementation
//! - [`schema`]: SQL schema constants and migration setup
//! - [`sqlite`]: SqliteSessionStore implementation
//!
//! [`GraphSnapshot`]: prddag_core::GraphSnapshot

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemorySessionStore;
pub use sqlite::SqliteSessionStore;
pub use traits::SessionStore;
pub use types::{SessionId, SessionSummary};
