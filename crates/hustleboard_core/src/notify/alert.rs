//! Alert types and the shared alert board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Task due within two days.
    Urgent,
    /// Task overdue.
    Critical,
    /// Meeting starting within the hour.
    Info,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Critical => "critical",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// `task-{id}` or `meeting-{id}`.
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub level: AlertLevel,
    /// App route the alert points to.
    pub link: String,
}

/// Desktop reminder candidate for a meeting at a 15-minute mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopNotice {
    pub meeting_id: String,
    pub minutes_until_start: i64,
    pub title: String,
    pub body: String,
}

/// Result of one derivation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub alerts: Vec<Alert>,
    pub desktop_notices: Vec<DesktopNotice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertSnapshot {
    pub alerts: Vec<Alert>,
    pub has_unread: bool,
    pub last_scan_at: Option<DateTime<Utc>>,
    /// Successful scans published so far.
    pub scans_completed: u64,
}

/// Latest alert list shared between the scanner and its readers.
#[derive(Debug, Default)]
pub struct AlertBoard {
    state: Mutex<AlertSnapshot>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the alert list wholesale. Unread iff the list is non-empty.
    pub fn publish(&self, alerts: Vec<Alert>, scanned_at: DateTime<Utc>) {
        let mut state = self.lock();
        state.has_unread = !alerts.is_empty();
        state.alerts = alerts;
        state.last_scan_at = Some(scanned_at);
        state.scans_completed += 1;
    }

    pub fn snapshot(&self) -> AlertSnapshot {
        self.lock().clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().alerts.clone()
    }

    pub fn has_unread(&self) -> bool {
        self.lock().has_unread
    }

    /// Clears the unread marker; the list itself stays until the next scan.
    pub fn mark_read(&self) {
        self.lock().has_unread = false;
    }

    fn lock(&self) -> MutexGuard<'_, AlertSnapshot> {
        // Every write leaves the snapshot consistent, so a poisoned lock is
        // still safe to read.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
