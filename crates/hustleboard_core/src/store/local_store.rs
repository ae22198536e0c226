//! Local store handle and per-kind CRUD operations.
//!
//! # Invariants
//! - Each operation waits for the configured latency first, then runs its
//!   read-modify-write with no suspension point in between.
//! - Store-generated `id`/`created_at`/`updated_at` always win over caller
//!   values; `update` cannot rewrite `id` or `created_at`.

use crate::config::CoreConfig;
use crate::model::record::{
    EntityKind, Fields, Record, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
use crate::model::timestamp::format_timestamp;
use crate::model::user::SessionUser;
use crate::storage::{KeyValueStorage, StorageError};
use crate::store::query::{FieldQuery, ListOptions};
use crate::store::scope::TeamScope;
use chrono::Utc;
use log::{debug, error, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
#[derive(Debug)]
pub enum StoreError {
    /// `update` targeted an id absent from the collection.
    NotFound { kind: EntityKind, id: String },
    /// Caller payload was not a JSON object.
    InvalidRecord(String),
    /// Persisted collection could not be decoded.
    CorruptCollection { key: String, message: String },
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidRecord(message) => write!(f, "invalid record payload: {message}"),
            Self::CorruptCollection { key, message } => {
                write!(f, "corrupt collection under `{key}`: {message}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Store handle bound to one team scope.
///
/// Cheap to clone; clones share the underlying storage.
#[derive(Clone)]
pub struct LocalStore {
    storage: Arc<dyn KeyValueStorage>,
    scope: TeamScope,
    key_prefix: Arc<str>,
    latency: Duration,
}

impl LocalStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, scope: TeamScope, config: &CoreConfig) -> Self {
        Self {
            storage,
            scope,
            key_prefix: Arc::from(config.storage_prefix.as_str()),
            latency: config.store_latency,
        }
    }

    /// Handle scoped to `user`'s team, or to the fallback scope without one.
    pub fn for_user(
        storage: Arc<dyn KeyValueStorage>,
        user: Option<&SessionUser>,
        config: &CoreConfig,
    ) -> Self {
        Self::new(storage, TeamScope::from_user(user), config)
    }

    pub fn scope(&self) -> &TeamScope {
        &self.scope
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn entity(&self, kind: EntityKind) -> EntityStore {
        EntityStore {
            key: self.scope.collection_key(&self.key_prefix, kind),
            store: self.clone(),
            kind,
        }
    }

    pub fn tasks(&self) -> EntityStore {
        self.entity(EntityKind::Task)
    }

    pub fn meetings(&self) -> EntityStore {
        self.entity(EntityKind::Meeting)
    }

    pub fn feedback(&self) -> EntityStore {
        self.entity(EntityKind::Feedback)
    }

    pub fn users(&self) -> EntityStore {
        self.entity(EntityKind::User)
    }

    pub fn projects(&self) -> EntityStore {
        self.entity(EntityKind::Project)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// CRUD operations over one entity kind's collection.
#[derive(Clone)]
pub struct EntityStore {
    store: LocalStore,
    kind: EntityKind,
    key: String,
}

impl EntityStore {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Storage key of this collection.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Returns the whole collection, optionally sorted and truncated.
    pub async fn list(&self, options: &ListOptions) -> StoreResult<Vec<Record>> {
        self.store.simulate_latency().await;
        let records = self.load()?;
        Ok(options.apply(records))
    }

    /// Returns records matching every clause of `query`, then applies
    /// `options`.
    pub async fn filter(
        &self,
        query: &FieldQuery,
        options: &ListOptions,
    ) -> StoreResult<Vec<Record>> {
        self.store.simulate_latency().await;
        let records = self
            .load()?
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();
        Ok(options.apply(records))
    }

    /// Returns the first record with `id`, or `None`.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Record>> {
        self.store.simulate_latency().await;
        Ok(self
            .load()?
            .into_iter()
            .find(|record| record.id() == Some(id)))
    }

    /// Appends a new record built from `fields` and returns it.
    ///
    /// # Errors
    /// - `InvalidRecord` when `fields` is not a JSON object.
    pub async fn create(&self, fields: Value) -> StoreResult<Record> {
        let mut fields = into_fields(fields)?;
        self.store.simulate_latency().await;

        for reserved in [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD] {
            if fields.remove(reserved).is_some() {
                debug!(
                    "event=store_create module=store kind={} status=ignored_field field={}",
                    self.kind, reserved
                );
            }
        }

        let now = format_timestamp(Utc::now());
        let mut record = Record::new();
        record.insert(ID_FIELD, Uuid::now_v7().to_string());
        record.insert(CREATED_AT_FIELD, now.clone());
        record.insert(UPDATED_AT_FIELD, now);
        record.merge(fields);

        let created = self.mutate("create", |records| {
            records.push(record.clone());
            Ok(record)
        })?;
        debug!(
            "event=store_create module=store status=ok kind={} scope={}",
            self.kind, self.store.scope
        );
        Ok(created)
    }

    /// Merges `patch` into the record with `id` and refreshes `updated_at`.
    ///
    /// # Errors
    /// - `NotFound` when no record has `id`; the collection is left unchanged.
    /// - `InvalidRecord` when `patch` is not a JSON object.
    pub async fn update(&self, id: &str, patch: Value) -> StoreResult<Record> {
        let mut patch = into_fields(patch)?;
        self.store.simulate_latency().await;

        patch.remove(ID_FIELD);
        patch.remove(CREATED_AT_FIELD);
        let now = format_timestamp(Utc::now());

        self.mutate("update", |records| {
            let record = records
                .iter_mut()
                .find(|record| record.id() == Some(id))
                .ok_or_else(|| StoreError::NotFound {
                    kind: self.kind,
                    id: id.to_string(),
                })?;
            record.merge(patch);
            record.insert(UPDATED_AT_FIELD, now);
            Ok(record.clone())
        })
    }

    /// Removes the record with `id` if present. Absent ids are a successful
    /// no-op.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.store.simulate_latency().await;
        self.mutate("delete", |records| {
            let before = records.len();
            records.retain(|record| record.id() != Some(id));
            if records.len() == before {
                debug!(
                    "event=store_delete module=store status=noop kind={} id={}",
                    self.kind, id
                );
            }
            Ok(true)
        })
    }

    fn load(&self) -> StoreResult<Vec<Record>> {
        let payload = self.store.storage.get_item(&self.key)?;
        decode_collection(&self.key, payload.as_deref())
    }

    fn mutate<T>(
        &self,
        op: &'static str,
        apply: impl FnOnce(&mut Vec<Record>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut apply = Some(apply);
        let mut outcome: Option<StoreResult<T>> = None;

        let written = self
            .store
            .storage
            .replace_item(&self.key, &mut |current: Option<&str>| {
                let apply = apply.take()?;
                let result = decode_collection(&self.key, current).and_then(|mut records| {
                    let value = apply(&mut records)?;
                    let payload = serde_json::to_string(&records).map_err(|err| {
                        StoreError::InvalidRecord(format!("cannot serialize collection: {err}"))
                    })?;
                    Ok((value, payload))
                });
                match result {
                    Ok((value, payload)) => {
                        outcome = Some(Ok(value));
                        Some(payload)
                    }
                    Err(err) => {
                        outcome = Some(Err(err));
                        None
                    }
                }
            });

        if let Err(err) = written {
            error!(
                "event=store_write module=store status=error op={op} kind={} key={} error={}",
                self.kind, self.key, err
            );
            return Err(err.into());
        }

        outcome.unwrap_or_else(|| {
            Err(StoreError::InvalidRecord(format!(
                "{op} transform was not applied to `{}`",
                self.key
            )))
        })
    }
}

fn into_fields(value: Value) -> StoreResult<Fields> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn decode_collection(key: &str, payload: Option<&str>) -> StoreResult<Vec<Record>> {
    let Some(payload) = payload else {
        return Ok(Vec::new());
    };
    serde_json::from_str(payload).map_err(|err| {
        warn!(
            "event=store_read module=store status=corrupt key={} error={}",
            key, err
        );
        StoreError::CorruptCollection {
            key: key.to_string(),
            message: err.to_string(),
        }
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
