//! Pure deadline derivation.

use crate::model::entities::{MeetingView, TaskView};
use crate::model::record::Record;
use crate::model::user::SessionUser;
use crate::notify::alert::{Alert, AlertLevel, DesktopNotice, ScanReport};
use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;

/// Tasks due within this many whole days raise an urgent alert.
pub const TASK_URGENT_WINDOW_DAYS: i64 = 2;
/// Meetings starting within this many minutes raise an info alert.
pub const MEETING_WINDOW_MINUTES: i64 = 60;
/// Desktop reminders fire on multiples of this many minutes.
pub const DESKTOP_NOTICE_STEP_MINUTES: i64 = 15;

const TASKS_LINK: &str = "/tasks";
const CALENDAR_LINK: &str = "/calendar";

/// Derives alerts for `user` from raw task and meeting records at `now`.
///
/// Records without a usable `id` are skipped with a warning.
pub fn scan_deadlines(
    tasks: &[Record],
    meetings: &[Record],
    user: &SessionUser,
    now: DateTime<Utc>,
) -> ScanReport {
    let mut report = ScanReport::default();

    for task in project::<TaskView>(tasks, "task") {
        if !task_concerns(&task, user) {
            continue;
        }
        if let Some(alert) = task_alert(&task, now) {
            report.alerts.push(alert);
        }
    }

    for meeting in project::<MeetingView>(meetings, "meeting") {
        if !meeting_concerns(&meeting, user) {
            continue;
        }
        let Some(minutes) = meeting
            .starts_at()
            .map(|start| minutes_until(start, now))
            .filter(|minutes| (0..=MEETING_WINDOW_MINUTES).contains(minutes))
        else {
            continue;
        };

        report.alerts.push(Alert {
            id: format!("meeting-{}", meeting.id),
            title: format!("Upcoming Meeting: {}", meeting.title),
            message: if minutes == 0 {
                "Starting now!".to_string()
            } else {
                format!("Starts in {minutes} min")
            },
            level: AlertLevel::Info,
            link: CALENDAR_LINK.to_string(),
        });

        if minutes % DESKTOP_NOTICE_STEP_MINUTES == 0 {
            report.desktop_notices.push(DesktopNotice {
                meeting_id: meeting.id.clone(),
                minutes_until_start: minutes,
                title: format!("Meeting: {}", meeting.title),
                body: format!("Starting in {minutes} minutes"),
            });
        }
    }

    report
}

/// Assigned to the user by id or email, or visible to managers.
fn task_concerns(task: &TaskView, user: &SessionUser) -> bool {
    user.is_manager()
        || task
            .assigned_to
            .as_deref()
            .is_some_and(|assignee| user.is_referenced_by(assignee))
}

fn meeting_concerns(meeting: &MeetingView, user: &SessionUser) -> bool {
    meeting.is_open_to_team()
        || meeting
            .attendees
            .iter()
            .any(|attendee| user.is_referenced_by(attendee))
}

fn task_alert(task: &TaskView, now: DateTime<Utc>) -> Option<Alert> {
    if task.is_completed() {
        return None;
    }
    let days_left = whole_days_until(task.due_at()?, now);

    if (0..=TASK_URGENT_WINDOW_DAYS).contains(&days_left) {
        let message = match days_left {
            0 => "Due today!".to_string(),
            1 => "Due in 1 day".to_string(),
            days => format!("Due in {days} days"),
        };
        return Some(Alert {
            id: format!("task-{}", task.id),
            title: format!("Task Due Soon: {}", task.title),
            message,
            level: AlertLevel::Urgent,
            link: TASKS_LINK.to_string(),
        });
    }

    if days_left < 0 {
        return Some(Alert {
            id: format!("task-{}", task.id),
            title: format!("Task Overdue: {}", task.title),
            message: format!("Overdue by {} days", days_left.abs()),
            level: AlertLevel::Critical,
            link: TASKS_LINK.to_string(),
        });
    }

    None
}

/// Whole elapsed days from `now` to `due`, truncated toward zero.
fn whole_days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (due - now).num_days()
}

/// Minutes from `now` to `start`, floored.
fn minutes_until(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (start - now).num_milliseconds().div_euclid(60_000)
}

/// Projects records into views; rejected records are logged and skipped.
pub(crate) fn project<T: DeserializeOwned>(records: &[Record], label: &'static str) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match record.to_entity::<T>() {
            Ok(view) => Some(view),
            Err(err) => {
                warn!(
                    "event=scan_skip module=notify status=corrupt kind={label} id={} error={}",
                    record.id().unwrap_or("-"),
                    err
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{minutes_until, whole_days_until};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn whole_days_truncate_toward_zero() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(whole_days_until(now + Duration::hours(47), now), 1);
        assert_eq!(whole_days_until(now - Duration::hours(23), now), 0);
        assert_eq!(whole_days_until(now - Duration::hours(49), now), -2);
    }

    #[test]
    fn minutes_floor_for_past_starts() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(minutes_until(now + Duration::seconds(59), now), 0);
        assert_eq!(minutes_until(now - Duration::seconds(1), now), -1);
        assert_eq!(minutes_until(now + Duration::minutes(45), now), 45);
    }
}
