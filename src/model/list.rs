use serde::{Deserialize, Serialize};

use super::Timestamp;

/// A named, user-curated grouping of artworks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkList {
    pub(crate) id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub(crate) artwork_ids: Vec<String>,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
}

impl ArtworkList {
    pub(crate) fn new(id: String, name: String, description: String, now: Timestamp) -> Self {
        Self {
            id,
            name,
            description,
            artwork_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Member artwork ids in the order they were added.
    pub fn artwork_ids(&self) -> &[String] {
        &self.artwork_ids
    }

    pub fn contains(&self, artwork_id: &str) -> bool {
        self.artwork_ids.iter().any(|id| id == artwork_id)
    }

    pub fn len(&self) -> usize {
        self.artwork_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artwork_ids.is_empty()
    }
}

/// Partial update for a list. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ListPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub(crate) fn apply(self, list: &mut ArtworkList) {
        if let Some(name) = self.name {
            list.name = name;
        }
        if let Some(description) = self.description {
            list.description = description;
        }
    }
}
