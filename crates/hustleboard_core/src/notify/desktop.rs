//! Best-effort desktop notification channel.

use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// No notification facility on this platform.
    Unavailable,
}

/// Platform notification facility. Implementations must not fail loudly:
/// delivery problems are swallowed.
pub trait DesktopNotifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;
    fn notify(&self, title: &str, body: &str);
}

/// Writes notices to the log. Used by headless front ends.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl DesktopNotifier for LogNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn notify(&self, title: &str, body: &str) {
        info!("event=desktop_notice module=notify title={title:?} body={body:?}");
    }
}

/// Channel with no facility behind it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl DesktopNotifier for SilentNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Unavailable
    }

    fn notify(&self, _title: &str, _body: &str) {}
}
