//! Snapshot codec - whole-collection JSON encoding.
//!
//! Every write carries the complete ordered collection rather than a delta,
//! so the last value written under a key is always a full, self-consistent
//! picture of that collection.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

use crate::error::SnapshotError;

/// The two persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Artworks,
    Lists,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 2] = [CollectionKind::Artworks, CollectionKind::Lists];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Artworks => "artworks",
            CollectionKind::Lists => "lists",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode a full collection for storage under `key`.
pub fn encode<T: Serialize>(key: &str, items: &[T]) -> Result<String, SnapshotError> {
    serde_json::to_string(items).map_err(|e| SnapshotError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Decode a stored collection.
///
/// Blank input and a JSON `null` both mean "nothing stored" and decode to an
/// empty collection. Anything else that is not a JSON array of `T` is corrupt.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Vec<T>, SnapshotError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = serde_json::from_str(raw).map_err(|e| SnapshotError::Decode {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    Ok(items.unwrap_or_default())
}
