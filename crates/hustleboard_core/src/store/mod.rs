//! Team-scoped local entity store.
//!
//! # Responsibility
//! - Emulate a remote CRUD API over one serialized collection per entity
//!   kind and team scope.
//! - Inject artificial latency so callers exercise their loading paths.
//!
//! # Invariants
//! - Every mutation rewrites the whole collection in one storage write.
//! - `update` never inserts; unknown ids fail with `NotFound`.
//! - Read paths report absence as empty/`None`, never as an error.
//! - A handle keeps the team scope it was created with.

pub mod local_store;
pub mod query;
pub mod scope;

pub use local_store::{EntityStore, LocalStore, StoreError, StoreResult};
pub use query::{FieldClause, FieldQuery, ListOptions, SortSpec};
pub use scope::TeamScope;
