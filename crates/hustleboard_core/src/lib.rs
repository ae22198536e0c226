//! Core of HustleBoard: team-scoped local persistence, sessions and
//! deadline alerts.
//! This crate is the single source of truth for data invariants; front ends
//! only render what it returns.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod report;
pub mod session;
pub mod storage;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entities::{
    FeedbackView, MeetingView, ProjectView, TaskPriority, TaskStatus, TaskView,
};
pub use model::record::{EntityKind, Fields, Record};
pub use model::timestamp::{format_timestamp, parse_timestamp};
pub use model::user::{SessionUser, UserRole};
pub use notify::{
    scan_deadlines, start_for_session, Alert, AlertBoard, AlertLevel, AlertSnapshot,
    DeadlineScanner, DesktopNotice, DesktopNotifier, LogNotifier, NotificationPermission,
    ScanReport, ScannerHandle, SilentNotifier,
};
pub use report::{weekly_summary, WeeklySummary};
pub use session::{RegisterRequest, SessionError, SessionResult, SessionService};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult};
pub use store::{
    EntityStore, FieldQuery, ListOptions, LocalStore, SortSpec, StoreError, StoreResult,
    TeamScope,
};

/// Minimal health-check API for front-end wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
