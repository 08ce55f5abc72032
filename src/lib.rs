//! A personal artwork catalog.
//!
//! [`CollectionStore`] owns two related collections, artworks and curated
//! lists, and keeps every artwork/list link recorded on both sides. Reads and
//! writes are synchronous against memory; each change is written back as a
//! full JSON snapshot of the touched collection to a pluggable
//! [`KeyValueStore`] by a background worker.
//!
//! ```ignore
//! use gallery_catalog::{CatalogConfig, CollectionStore, FileKeyValueStore, NewArtwork};
//!
//! let kv = FileKeyValueStore::open("/tmp/catalog")?;
//! let store = CollectionStore::open(kv, CatalogConfig::default())?;
//!
//! let art = store.add_artwork(NewArtwork {
//!     gallery: "Galerie Maeght".into(),
//!     price: "€12,000".into(),
//!     ..NewArtwork::new("Blue Nude", "Matisse")
//! });
//! store.toggle_favorite(art.id());
//! assert_eq!(store.get_artworks_by_filter("favorites").len(), 1);
//! ```

mod catalog;
mod config;
mod error;
mod kv;
mod model;
mod persistence;
mod snapshot;

pub use catalog::{
    ChangeEvent, ChangeKind, CollectionStore, HydrationReport, LoadOutcome, StoreState,
    CHANGE_EVENT,
};
pub use config::{CatalogConfig, DEFAULT_ARTWORKS_KEY, DEFAULT_LISTS_KEY, DEFAULT_RECENT_LIMIT};
pub use error::{CatalogError, KvError, Result, SnapshotError};
pub use kv::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
pub use model::{
    Artwork, ArtworkFilter, ArtworkList, ArtworkPatch, CatalogStats, ListPatch, NewArtwork,
    Timestamp,
};
pub use persistence::{PersistenceStats, PersistenceWorker};
pub use snapshot::{decode as decode_snapshot, encode as encode_snapshot, CollectionKind};
