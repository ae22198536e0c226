//! Explicit list options and field queries for store reads.

use crate::model::record::Record;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Ordering request: one field, ascending unless `descending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Parses `field` or `-field` (descending). Returns `None` for an empty
    /// field name.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (field, descending) = match value.strip_prefix('-') {
            Some(rest) => (rest.trim(), true),
            None => (value, false),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            descending,
        })
    }

    /// Stable sort; records missing the field (or holding `null`) stay last
    /// in both directions.
    pub fn apply(&self, records: &mut [Record]) {
        records.sort_by(|left, right| {
            let left = left.get(&self.field).filter(|value| !value.is_null());
            let right = right.get(&self.field).filter(|value| !value.is_null());
            match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(left), Some(right)) => {
                    let ordering = compare_values(left, right);
                    if self.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
            }
        });
    }
}

/// Options shared by `list` and `filter`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
}

impl ListOptions {
    pub fn sorted_by(sort: SortSpec) -> Self {
        Self {
            sort: Some(sort),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn apply(&self, mut records: Vec<Record>) -> Vec<Record> {
        if let Some(sort) = &self.sort {
            sort.apply(&mut records);
        }
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        records
    }
}

/// One comparison inside a [`FieldQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldClause {
    /// Field equals value under type-aware equality (see [`values_match`]).
    Equals { field: String, value: Value },
}

impl FieldClause {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Equals { field, value } => values_match(value, record.get(field)),
        }
    }
}

/// Conjunction of clauses; an empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldQuery {
    clauses: Vec<FieldClause>,
}

impl FieldQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality clause.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(FieldClause::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Builds an all-equal query from a JSON object, one clause per key.
    pub fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        object
            .iter()
            .fold(Self::new(), |query, (field, value)| query.eq(field.clone(), value.clone()))
    }

    pub fn clauses(&self) -> &[FieldClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

/// Type-aware equality between a query value and a record field.
///
/// - `null` matches a missing or null field.
/// - Numbers compare numerically; a numeric string equals the number it
///   parses to.
/// - Booleans only equal booleans.
/// - Everything else compares structurally.
pub fn values_match(expected: &Value, actual: Option<&Value>) -> bool {
    let actual = match actual {
        None | Some(Value::Null) => return expected.is_null(),
        Some(actual) => actual,
    };

    match (expected, actual) {
        (Value::Number(left), Value::Number(right)) => numbers_equal(left, right),
        (Value::Number(number), Value::String(text))
        | (Value::String(text), Value::Number(number)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .zip(number.as_f64())
            .is_some_and(|(parsed, number)| parsed == number),
        _ => expected == actual,
    }
}

fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return left == right;
    }
    if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
        return left == right;
    }
    left.as_f64() == right.as_f64()
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left
            .as_f64()
            .partial_cmp(&right.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(left), Value::String(right)) => left.cmp(right),
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
