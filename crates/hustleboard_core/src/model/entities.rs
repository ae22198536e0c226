//! Typed read-only views over entity records.
//!
//! Records are schemaless, so every view field is read leniently: missing,
//! `null` or wrongly typed values take the field default, ids and text accept
//! numbers, unknown status strings map to `Other`. Only a missing or
//! non-scalar `id` rejects a record.

use crate::model::timestamp::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Board column of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Completed,
    #[serde(other)]
    Other,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskView {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub project_id: Option<String>,
    /// User id or email of the assignee.
    #[serde(default, deserialize_with = "lenient_text")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub priority: TaskPriority,
    #[serde(default, deserialize_with = "lenient_text")]
    pub due_date: Option<String>,
}

impl TaskView {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Parsed due date; empty and malformed values read as no due date.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeetingView {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub scheduled_date: Option<String>,
    /// User ids or emails. Empty means the whole team is invited.
    #[serde(default, deserialize_with = "attendee_list")]
    pub attendees: Vec<String>,
    #[serde(
        default = "default_duration_minutes",
        deserialize_with = "lenient_duration"
    )]
    pub duration_minutes: u32,
    #[serde(default, deserialize_with = "lenient_text")]
    pub meeting_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

impl MeetingView {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.scheduled_date.as_deref().and_then(parse_timestamp)
    }

    pub fn is_open_to_team(&self) -> bool {
        self.attendees.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedbackView {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    /// Email of the recipient.
    #[serde(default, deserialize_with = "lenient_text")]
    pub target_user: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub task_id: Option<String>,
    /// Kept raw: forms submit ratings as strings, imports as numbers.
    #[serde(default)]
    pub rating: Value,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub visibility: Option<String>,
    /// Email of the author.
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    /// Creation time written by older imports.
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_date: Option<String>,
}

impl FeedbackView {
    /// `created_at` when it parses, otherwise `created_date`.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| self.created_date.as_deref().and_then(parse_timestamp))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectView {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

fn default_duration_minutes() -> u32 {
    60
}

/// Strings as-is, numbers in their JSON spelling, anything else `None`.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Value::deserialize(deserializer)?)
        .ok_or_else(|| D::Error::custom("id must be a string or a number"))
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// A list keeps its scalar entries; a lone scalar is a one-entry list.
fn attendee_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

fn lenient_duration<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let minutes = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(minutes.unwrap_or_else(default_duration_minutes))
}
