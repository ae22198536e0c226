//! Deadline alerts for the session user.
//!
//! # Responsibility
//! - Derive transient alerts from tasks and meetings (pure, clock injected).
//! - Drive periodic rescans and publish results to a shared alert board.
//! - Forward meeting reminders to a best-effort desktop channel.
//!
//! # Invariants
//! - Alerts are never persisted; each scan replaces the previous list.
//! - A failed scan leaves the previous alerts in place.
//! - Derivation output order: tasks first, then meetings, each in
//!   collection order.

pub mod alert;
pub mod desktop;
pub mod scan;
pub mod scanner;

pub use alert::{Alert, AlertBoard, AlertLevel, AlertSnapshot, DesktopNotice, ScanReport};
pub use desktop::{DesktopNotifier, LogNotifier, NotificationPermission, SilentNotifier};
pub use scan::scan_deadlines;
pub use scanner::{start_for_session, DeadlineScanner, ScannerHandle};
