//! Durable key-value storage for catalog snapshots.
//!
//! The catalog only ever needs three operations against its backing medium:
//! read a whole value, replace a whole value, and drop a key. Backends are
//! free to be as simple as a `HashMap` or as durable as a directory of files.
//!
//! ## Example
//!
//! ```ignore
//! use gallery_catalog::{InMemoryKeyValueStore, KeyValueStore};
//!
//! let kv = InMemoryKeyValueStore::new();
//! kv.set("artworks", "[]")?;
//! assert_eq!(kv.get("artworks")?.as_deref(), Some("[]"));
//! ```

mod file;
mod in_memory;

use std::sync::Arc;

use crate::error::KvError;

pub use file::FileKeyValueStore;
pub(crate) use file::validate_key;
pub use in_memory::InMemoryKeyValueStore;

/// String-keyed, string-valued persistence medium.
///
/// All methods take `&self`; implementations use interior mutability so a
/// single store can be shared between the catalog and its write-back worker.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`. Returns `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Insert or replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), KvError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        (**self).remove(key)
    }
}
