//! Key-value store abstraction with typed JSON helpers.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{de::DeserializeOwned, Serialize};

use crate::StoreError;

/// A string-keyed, string-valued store.
///
/// Semantics follow browser local storage: missing keys read as `None`,
/// removing a missing key is not an error, and `clear` empties everything.
pub trait KvStore: Send + Sync {
    /// Read a raw value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a raw value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// List all keys.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), StoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with entries.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.clear();
        Ok(())
    }
}

/// Typed wrapper around a [`KvStore`].
///
/// Provides JSON serialization for values that are stored as encoded
/// strings (the user profile, for instance).
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn KvStore>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Wrap a backend.
    pub fn new(backend: impl KvStore + 'static) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    /// Wrap an already shared backend.
    pub fn from_shared(backend: Arc<dyn KvStore>) -> Self {
        Self { inner: backend }
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    /// Set a raw value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    /// Remove a key.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }

    /// List all keys.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.inner.keys()
    }

    /// Remove every key.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear()
    }

    /// Check if a key exists.
    pub fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(key)
    }

    /// Get a JSON-encoded value.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.inner.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Set a JSON-encoded value.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.inner.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("access_token", "abc").unwrap();
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("abc"));

        store.set("access_token", "def").unwrap();
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn test_memory_store_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nothing").is_ok());
    }

    #[test]
    fn test_memory_store_keys_and_clear() {
        let store = MemoryStore::with_entries([("b", "2"), ("a", "1")]);
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
        assert!(store.exists("a").unwrap());

        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
        assert!(!store.exists("a").unwrap());
    }

    #[test]
    fn test_store_json_helpers() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Profile {
            role: String,
        }

        let store = Store::new(MemoryStore::new());
        store
            .set_json("userData", &Profile { role: "staff".into() })
            .unwrap();

        assert_eq!(
            store.get("userData").unwrap().as_deref(),
            Some(r#"{"role":"staff"}"#)
        );
        let profile: Option<Profile> = store.get_json("userData").unwrap();
        assert_eq!(profile, Some(Profile { role: "staff".into() }));

        let missing: Option<Profile> = store.get_json("other").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_store_json_corrupt_value() {
        let store = Store::new(MemoryStore::with_entries([("userData", "{not json")]));
        let result: Result<Option<serde_json::Value>, _> = store.get_json("userData");
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_store_shares_backend() {
        let backend: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let a = Store::from_shared(backend.clone());
        let b = Store::from_shared(backend);

        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
    }
}
