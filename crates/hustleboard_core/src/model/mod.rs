//! Domain model for team-scoped entity collections.
//!
//! # Responsibility
//! - Define the generic JSON record persisted by the local store.
//! - Provide typed read-only views (task, meeting, feedback, project) used by
//!   derivations such as deadline scanning and timesheet summaries.
//! - Define the session user shape shared by auth, store scoping and scanning.
//!
//! # Invariants
//! - Records always carry a string `id` once created by the store.
//! - Typed views never write back; records stay the source of truth.

pub mod entities;
pub mod record;
pub mod timestamp;
pub mod user;
