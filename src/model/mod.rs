//! Catalog entities: artworks, curated lists, and the inputs used to create
//! and edit them.
//!
//! Entities handed out by the catalog are detached copies. Identity,
//! timestamps and cross-references are only readable here; they change
//! exclusively through [`CollectionStore`](crate::CollectionStore) operations.

mod artwork;
mod clock;
mod filter;
mod list;

pub use artwork::{Artwork, ArtworkPatch, NewArtwork};
pub use clock::Timestamp;
pub use filter::{ArtworkFilter, CatalogStats};
pub use list::{ArtworkList, ListPatch};

pub(crate) use clock::Clock;

/// Generate a fresh opaque entity id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Append `id` unless already present. Returns true if it was appended.
pub(crate) fn push_unique(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        return false;
    }
    ids.push(id.to_string());
    true
}

/// Remove every occurrence of `id`. Returns true if anything was removed.
pub(crate) fn remove_id(ids: &mut Vec<String>, id: &str) -> bool {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    ids.len() != before
}
