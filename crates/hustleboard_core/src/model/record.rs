//! Generic entity record and entity kinds.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Field map of one record.
pub type Fields = Map<String, Value>;

/// Entity kinds with their own collection per team scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    Meeting,
    Feedback,
    User,
    Project,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Task,
        EntityKind::Meeting,
        EntityKind::Feedback,
        EntityKind::User,
        EntityKind::Project,
    ];

    /// Lower-cased name used as the storage key suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Meeting => "meeting",
            Self::Feedback => "feedback",
            Self::User => "user",
            Self::Project => "project",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted entity: a JSON object keyed by field name.
///
/// Serialized transparently, so a collection is a plain JSON array of
/// objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Fields) -> Self {
        Self(fields)
    }

    /// Store-assigned identifier. `None` only for records that were never
    /// created through the store.
    pub fn id(&self) -> Option<&str> {
        self.str_field(ID_FIELD)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.str_field(CREATED_AT_FIELD)
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.str_field(UPDATED_AT_FIELD)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the field when it holds a JSON string.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Shallow merge: every field in `patch` overwrites the same field here.
    pub fn merge(&mut self, patch: Fields) {
        for (field, value) in patch {
            self.0.insert(field, value);
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }

    /// Deserializes a typed view of this record.
    pub fn to_entity<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

impl From<Fields> for Record {
    fn from(value: Fields) -> Self {
        Self(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Object(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, Record};
    use serde_json::json;

    #[test]
    fn record_serializes_as_plain_object() {
        let mut record = Record::new();
        record.insert("id", "1");
        record.insert("title", "Ship it");

        let text = serde_json::to_string(&vec![record]).unwrap();
        assert_eq!(text, r#"[{"id":"1","title":"Ship it"}]"#);
    }

    #[test]
    fn merge_overwrites_and_keeps_untouched_fields() {
        let mut record: Record = serde_json::from_value(json!({
            "id": "1",
            "status": "todo",
            "priority": "high"
        }))
        .unwrap();

        let patch = json!({ "status": "completed" });
        record.merge(patch.as_object().cloned().unwrap());

        assert_eq!(record.str_field("status"), Some("completed"));
        assert_eq!(record.str_field("priority"), Some("high"));
    }

    #[test]
    fn entity_kind_names_are_lowercase() {
        let names: Vec<_> = EntityKind::ALL.iter().map(|kind| kind.as_str()).collect();
        assert_eq!(names, ["task", "meeting", "feedback", "user", "project"]);
    }
}
