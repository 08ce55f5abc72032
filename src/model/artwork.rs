use serde::{Deserialize, Serialize};

use super::Timestamp;

/// A single catalogued piece.
///
/// Descriptive metadata is free text. `price` and `year` are kept as the user
/// typed them ("$4,200", "c. 1910").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub(crate) id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub gallery: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub notes: String,
    /// Opaque image reference; empty means no image.
    #[serde(default)]
    pub image_uri: String,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
    #[serde(default)]
    pub(crate) list_ids: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Artwork {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Ids of the lists this artwork belongs to, in the order it joined them.
    pub fn list_ids(&self) -> &[String] {
        &self.list_ids
    }

    pub fn in_list(&self, list_id: &str) -> bool {
        self.list_ids.iter().any(|id| id == list_id)
    }

    pub fn has_image(&self) -> bool {
        !self.image_uri.is_empty()
    }

    /// Case-insensitive substring match over the searchable text fields.
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [
            &self.title,
            &self.artist,
            &self.gallery,
            &self.medium,
            &self.notes,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Fields for a new artwork. Id and timestamps are assigned by the catalog.
///
/// `list_ids` are linked on both sides when the artwork is added; ids of
/// lists that do not exist are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewArtwork {
    pub title: String,
    pub artist: String,
    pub gallery: String,
    pub price: String,
    pub dimensions: String,
    pub medium: String,
    pub year: String,
    pub notes: String,
    pub image_uri: String,
    pub list_ids: Vec<String>,
    pub is_favorite: bool,
}

impl NewArtwork {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            ..Self::default()
        }
    }

    pub(crate) fn into_artwork(self, id: String, now: Timestamp) -> Artwork {
        Artwork {
            id,
            title: self.title,
            artist: self.artist,
            gallery: self.gallery,
            price: self.price,
            dimensions: self.dimensions,
            medium: self.medium,
            year: self.year,
            notes: self.notes,
            image_uri: self.image_uri,
            created_at: now,
            updated_at: now,
            list_ids: Vec::new(),
            is_favorite: self.is_favorite,
        }
    }
}

/// Partial update for an artwork. `None` leaves a field untouched.
///
/// List membership is not part of a patch; use
/// [`CollectionStore::add_artwork_to_list`](crate::CollectionStore::add_artwork_to_list)
/// and its counterpart so both sides stay in sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtworkPatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub gallery: Option<String>,
    pub price: Option<String>,
    pub dimensions: Option<String>,
    pub medium: Option<String>,
    pub year: Option<String>,
    pub notes: Option<String>,
    pub image_uri: Option<String>,
    pub is_favorite: Option<bool>,
}

impl ArtworkPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply(self, artwork: &mut Artwork) {
        let fields = [
            (self.title, &mut artwork.title),
            (self.artist, &mut artwork.artist),
            (self.gallery, &mut artwork.gallery),
            (self.price, &mut artwork.price),
            (self.dimensions, &mut artwork.dimensions),
            (self.medium, &mut artwork.medium),
            (self.year, &mut artwork.year),
            (self.notes, &mut artwork.notes),
            (self.image_uri, &mut artwork.image_uri),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(is_favorite) = self.is_favorite {
            artwork.is_favorite = is_favorite;
        }
    }
}
