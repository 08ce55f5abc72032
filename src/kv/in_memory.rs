//! InMemoryKeyValueStore - HashMap-backed key-value store for tests and ephemeral catalogs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::KeyValueStore;
use crate::error::KvError;

/// In-memory key-value store backed by a HashMap.
///
/// Clone-friendly via Arc: clones share the same storage, which lets a test
/// keep a handle on what the catalog has written.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    storage: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let storage = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            storage: Arc::new(RwLock::new(storage)),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| KvError::LockPoisoned("read"))?;
        Ok(storage.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| KvError::LockPoisoned("write"))?;
        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| KvError::LockPoisoned("remove"))?;
        storage.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let store = InMemoryKeyValueStore::new();
        store.set("artworks", "[]").unwrap();

        assert_eq!(store.get("artworks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn set_replaces_previous_value() {
        let store = InMemoryKeyValueStore::new();
        store.set("lists", "[1]").unwrap();
        store.set("lists", "[2]").unwrap();

        assert_eq!(store.get("lists").unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn remove_missing_is_ok() {
        let store = InMemoryKeyValueStore::new();
        store.remove("missing").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn clone_shares_storage() {
        let store = InMemoryKeyValueStore::with_entries([("artworks", "[]")]);
        let clone = store.clone();

        clone.remove("artworks").unwrap();
        assert!(store.get("artworks").unwrap().is_none());
    }
}
