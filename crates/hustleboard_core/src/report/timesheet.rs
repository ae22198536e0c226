//! Weekly timesheet summary for the session user.

use crate::model::entities::{FeedbackView, TaskView};
use crate::model::record::Record;
use crate::model::user::SessionUser;
use crate::notify::scan::project;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Length of the feedback look-back window.
pub const SUMMARY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeeklySummary {
    /// Completed tasks assigned to the user (all time).
    pub completed_tasks: usize,
    /// Feedback the user wrote in the window.
    pub feedback_given: usize,
    /// Feedback addressed to the user in the window.
    pub feedback_received: usize,
}

/// Counts the user's completed tasks and recent feedback.
///
/// Feedback without a parseable creation time falls outside the window.
pub fn weekly_summary(
    tasks: &[Record],
    feedback: &[Record],
    user: &SessionUser,
    now: DateTime<Utc>,
) -> WeeklySummary {
    let window_start = now - Duration::days(SUMMARY_WINDOW_DAYS);

    let completed_tasks = project::<TaskView>(tasks, "task")
        .into_iter()
        .filter(|task| {
            task.is_completed() && task.assigned_to.as_deref() == Some(user.email.as_str())
        })
        .count();

    let recent: Vec<FeedbackView> = project::<FeedbackView>(feedback, "feedback")
        .into_iter()
        .filter(|entry| entry.created().is_some_and(|created| created > window_start))
        .collect();

    let feedback_given = recent
        .iter()
        .filter(|entry| entry.created_by.as_deref() == Some(user.email.as_str()))
        .count();
    let feedback_received = recent
        .iter()
        .filter(|entry| entry.target_user.as_deref() == Some(user.email.as_str()))
        .count();

    WeeklySummary {
        completed_tasks,
        feedback_given,
        feedback_received,
    }
}
