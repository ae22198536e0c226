//! Periodic scan driver around [`scan_deadlines`].
//!
//! # Invariants
//! - The first scan runs immediately on start, then once per interval.
//! - A scan in progress is never interrupted; stop requests take effect
//!   between scans.
//! - A desktop notice is sent at most once per (meeting, minute mark) for the
//!   lifetime of a scanner.

use crate::config::ConfigError;
use crate::model::user::SessionUser;
use crate::notify::alert::{AlertBoard, ScanReport};
use crate::notify::desktop::{DesktopNotifier, NotificationPermission};
use crate::notify::scan::scan_deadlines;
use crate::store::{ListOptions, LocalStore, StoreResult};
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Scans deadlines for one session user and publishes to an alert board.
pub struct DeadlineScanner {
    store: LocalStore,
    user: SessionUser,
    board: Arc<AlertBoard>,
    notifier: Arc<dyn DesktopNotifier>,
    notified: HashSet<(String, i64)>,
}

impl DeadlineScanner {
    pub fn new(
        store: LocalStore,
        user: SessionUser,
        board: Arc<AlertBoard>,
        notifier: Arc<dyn DesktopNotifier>,
    ) -> Self {
        Self {
            store,
            user,
            board,
            notifier,
            notified: HashSet::new(),
        }
    }

    pub fn board(&self) -> &Arc<AlertBoard> {
        &self.board
    }

    /// Runs one scan: fetches tasks and meetings concurrently, publishes the
    /// derived alerts, and sends due desktop notices.
    ///
    /// On error nothing is published and the board keeps its previous list.
    pub async fn scan_once(&mut self) -> StoreResult<ScanReport> {
        let tasks_store = self.store.tasks();
        let meetings_store = self.store.meetings();
        let options = ListOptions::default();
        let (tasks, meetings) =
            tokio::join!(tasks_store.list(&options), meetings_store.list(&options));
        let (tasks, meetings) = (tasks?, meetings?);

        let now = Utc::now();
        let report = scan_deadlines(&tasks, &meetings, &self.user, now);
        self.board.publish(report.alerts.clone(), now);
        self.send_desktop_notices(&report);

        debug!(
            "event=deadline_scan module=notify status=ok tasks={} meetings={} alerts={}",
            tasks.len(),
            meetings.len(),
            report.alerts.len()
        );
        Ok(report)
    }

    /// Spawns the periodic loop on the current tokio runtime.
    ///
    /// # Errors
    /// - `ZeroScanInterval` when `interval` is zero.
    pub fn spawn(self, interval: Duration) -> Result<ScannerHandle, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroScanInterval);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let board = Arc::clone(&self.board);
        let join = tokio::spawn(self.run(interval, stop_rx));
        Ok(ScannerHandle {
            stop_tx,
            join,
            board,
        })
    }

    async fn run(mut self, interval: Duration, mut stop_rx: watch::Receiver<bool>) {
        info!(
            "event=scanner_start module=notify status=ok interval_ms={} scope={}",
            interval.as_millis(),
            self.store.scope()
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.scan_once().await {
                        warn!(
                            "event=deadline_scan module=notify status=error retry_in_ms={} error={}",
                            interval.as_millis(),
                            err
                        );
                    }
                }
                // Fires on an explicit stop and when the handle is dropped.
                _ = stop_rx.changed() => break,
            }
        }

        info!("event=scanner_stop module=notify status=ok");
    }

    fn send_desktop_notices(&mut self, report: &ScanReport) {
        if report.desktop_notices.is_empty() {
            return;
        }
        let permission = self.notifier.permission();
        if permission != NotificationPermission::Granted {
            debug!(
                "event=desktop_notice module=notify status=skipped permission={permission:?} pending={}",
                report.desktop_notices.len()
            );
            return;
        }

        for notice in &report.desktop_notices {
            let bucket = (notice.meeting_id.clone(), notice.minutes_until_start);
            if self.notified.insert(bucket) {
                self.notifier.notify(&notice.title, &notice.body);
            }
        }
    }
}

/// Owner of a running scan loop. Dropping it stops the loop.
pub struct ScannerHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
    board: Arc<AlertBoard>,
}

impl ScannerHandle {
    pub fn board(&self) -> &Arc<AlertBoard> {
        &self.board
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Requests a stop and waits for the loop to exit. A scan already in
    /// flight completes first.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.join.await {
            warn!("event=scanner_stop module=notify status=error error={err}");
        }
    }
}

/// Starts scanning for `user`, or returns `None` when there is no session.
pub fn start_for_session(
    store: LocalStore,
    user: Option<SessionUser>,
    board: Arc<AlertBoard>,
    notifier: Arc<dyn DesktopNotifier>,
    interval: Duration,
) -> Result<Option<ScannerHandle>, ConfigError> {
    let Some(user) = user else {
        debug!("event=scanner_start module=notify status=suppressed reason=no_session");
        return Ok(None);
    };
    DeadlineScanner::new(store, user, board, notifier)
        .spawn(interval)
        .map(Some)
}
