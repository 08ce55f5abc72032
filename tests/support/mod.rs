#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use gallery_catalog::{
    CatalogConfig, CollectionStore, InMemoryKeyValueStore, KeyValueStore, KvError, NewArtwork,
};

/// Wraps an in-memory store and records every successful `set` key.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: InMemoryKeyValueStore,
    sets: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new(inner: InMemoryKeyValueStore) -> Self {
        Self {
            inner,
            sets: Mutex::new(Vec::new()),
        }
    }

    pub fn sets(&self) -> Vec<String> {
        self.sets.lock().unwrap().clone()
    }

    pub fn sets_for(&self, key: &str) -> usize {
        self.sets().iter().filter(|k| *k == key).count()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.inner.set(key, value)?;
        self.sets.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        self.inner.remove(key)
    }
}

/// A store whose reads and/or writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryKeyValueStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn failing_writes() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn failing_reads(inner: InMemoryKeyValueStore) -> Self {
        let store = Self {
            inner,
            ..Self::default()
        };
        store.fail_reads.store(true, Ordering::SeqCst);
        store
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("secure storage locked".into()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Io {
                key: key.to_string(),
                message: "quota exceeded".into(),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("read-only".into()));
        }
        self.inner.remove(key)
    }
}

pub fn open_in_memory() -> (CollectionStore<InMemoryKeyValueStore>, InMemoryKeyValueStore) {
    let kv = InMemoryKeyValueStore::new();
    let store = CollectionStore::open(kv.clone(), CatalogConfig::default()).unwrap();
    (store, kv)
}

pub fn artwork(title: &str, artist: &str) -> NewArtwork {
    NewArtwork::new(title, artist)
}

/// Deterministic pseudo-random sequence for operation fuzzing.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}
