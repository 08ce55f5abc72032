use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::KeyValueStore) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    #[error("key-value store lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("key-value io error on {key}: {message}")]
    Io { key: String, message: String },
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while encoding or decoding a collection snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot {key}: {message}")]
    Encode { key: String, message: String },
    #[error("failed to decode snapshot {key}: {message}")]
    Decode { key: String, message: String },
}

/// Top-level error for catalog construction and maintenance calls.
///
/// Ordinary CRUD never surfaces these; storage failures during mutation are
/// logged and absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Kv(#[from] KvError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("invalid configuration for {name}: {message}")]
    Config { name: String, message: String },
    #[error("persistence worker has stopped")]
    WorkerStopped,
}

impl CatalogError {
    pub(crate) fn config(name: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Config {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
