//! Key-value storage backends standing in for browser local storage.
//!
//! # Responsibility
//! - Define the string-keyed, string-valued storage contract used by the
//!   entity store and the session registry.
//! - Provide an in-memory backend and a durable SQLite backend.
//!
//! # Invariants
//! - `replace_item` runs read, transform and write under one lock, so a
//!   read-modify-write is never interleaved with another writer.
//! - Backends never interpret values; serialization belongs to callers.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure inside a storage backend, distinct from any "not found" outcome.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    QuotaExceeded {
        key: String,
        required_bytes: usize,
        quota_bytes: usize,
    },
    LockPoisoned,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                key,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes needed, quota is {quota_bytes}"
            ),
            Self::LockPoisoned => write!(f, "storage lock poisoned by a panicked writer"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Transform applied by [`KeyValueStorage::replace_item`].
///
/// Receives the current value (if any). Returning `Some(next)` writes `next`;
/// returning `None` leaves the key untouched.
pub type ItemTransform<'a> = dyn FnMut(Option<&str>) -> Option<String> + 'a;

/// Process-wide string storage shared by every store handle.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    /// Returns all keys in ascending order.
    fn keys(&self) -> StorageResult<Vec<String>>;
    /// Atomically reads, transforms and (optionally) rewrites one key.
    fn replace_item(&self, key: &str, transform: &mut ItemTransform<'_>) -> StorageResult<()>;
}
