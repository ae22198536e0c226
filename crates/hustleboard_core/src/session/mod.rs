//! Session and local user registry.
//!
//! # Responsibility
//! - Register, authenticate and persist the current session user.
//! - Hand out store handles bound to the session's team scope.
//!
//! # Invariants
//! - The persisted session user never carries a password.
//! - Emails are unique within the registry.
//! - Joining by invite code inherits the inviter's team and code.

mod auth;

pub use auth::{
    RegisterRequest, SessionError, SessionResult, SessionService, DEMO_MANAGER_EMAIL,
    GUEST_EMAIL, REGISTRY_KEY, SESSION_KEY,
};
