use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::kv::KeyValueStore;
use crate::snapshot::{self, CollectionKind};

/// What hydration found under one collection key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum LoadOutcome {
    /// Snapshot decoded with this many entities.
    Loaded(usize),
    /// Nothing stored under the key.
    Missing,
    /// A value was stored but could not be decoded; the collection starts empty.
    Corrupt(String),
    /// The store itself failed the read; the collection starts empty.
    Unavailable(String),
}

impl LoadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, LoadOutcome::Corrupt(_) | LoadOutcome::Unavailable(_))
    }
}

/// Result of bringing a store from Hydrating to Ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationReport {
    pub artworks: LoadOutcome,
    pub lists: LoadOutcome,
    /// Broken cross-references fixed while loading.
    pub repaired_links: usize,
}

impl HydrationReport {
    pub fn outcome(&self, kind: CollectionKind) -> &LoadOutcome {
        match kind {
            CollectionKind::Artworks => &self.artworks,
            CollectionKind::Lists => &self.lists,
        }
    }

    /// No data was lost or repaired.
    pub fn is_clean(&self) -> bool {
        !self.artworks.is_failure() && !self.lists.is_failure() && self.repaired_links == 0
    }
}

/// Read and decode one collection, falling back to empty on any failure.
pub(crate) fn load<T, S>(kv: &S, kind: CollectionKind, key: &str) -> (Vec<T>, LoadOutcome)
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match kv.get(key) {
        Ok(None) => {
            debug!(collection = %kind, key = %key, "no stored snapshot");
            (Vec::new(), LoadOutcome::Missing)
        }
        Ok(Some(raw)) => match snapshot::decode::<T>(key, &raw) {
            Ok(items) => {
                let count = items.len();
                (items, LoadOutcome::Loaded(count))
            }
            Err(e) => {
                error!(
                    collection = %kind,
                    key = %key,
                    error = %e,
                    "corrupt snapshot, starting empty"
                );
                (Vec::new(), LoadOutcome::Corrupt(e.to_string()))
            }
        },
        Err(e) => {
            error!(
                collection = %kind,
                key = %key,
                error = %e,
                "snapshot read failed, starting empty"
            );
            (Vec::new(), LoadOutcome::Unavailable(e.to_string()))
        }
    }
}
