//! Activity summaries derived from team collections.

mod timesheet;

pub use timesheet::{weekly_summary, WeeklySummary, SUMMARY_WINDOW_DAYS};
