//! In-memory storage backend with an optional byte quota.

use super::{ItemTransform, KeyValueStorage, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Volatile backend; contents vanish with the process.
///
/// The quota, when set, caps the summed byte length of all keys and values,
/// mirroring the per-origin limit of browser storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.items.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn write_locked(
        &self,
        items: &mut BTreeMap<String, String>,
        key: &str,
        value: String,
    ) -> StorageResult<()> {
        if let Some(quota_bytes) = self.quota_bytes {
            let others: usize = items
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, stored)| existing.len() + stored.len())
                .sum();
            let required_bytes = others + key.len() + value.len();
            if required_bytes > quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    quota_bytes,
                });
            }
        }
        items.insert(key.to_string(), value);
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self.lock()?;
        self.write_locked(&mut items, key, value.to_string())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn replace_item(&self, key: &str, transform: &mut ItemTransform<'_>) -> StorageResult<()> {
        let mut items = self.lock()?;
        let next = transform(items.get(key).map(String::as_str));
        match next {
            Some(value) => self.write_locked(&mut items, key, value),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStorage;
    use crate::storage::{KeyValueStorage, StorageError};

    #[test]
    fn set_get_remove_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set_item("user", "{}").unwrap();
        assert_eq!(storage.get_item("user").unwrap().as_deref(), Some("{}"));

        storage.remove_item("user").unwrap();
        assert!(storage.get_item("user").unwrap().is_none());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_previous_value() {
        let storage = MemoryStorage::with_quota(16);
        storage.set_item("k", "small").unwrap();

        let err = storage.set_item("k", "this value is far too long").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn replace_item_skips_write_when_transform_returns_none() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "v1").unwrap();

        let mut seen = None;
        storage
            .replace_item("k", &mut |current: Option<&str>| {
                seen = current.map(str::to_string);
                None
            })
            .unwrap();

        assert_eq!(seen.as_deref(), Some("v1"));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v1"));
    }
}
