use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selection applied by
/// [`CollectionStore::get_artworks_by_filter`](crate::CollectionStore::get_artworks_by_filter).
///
/// Parsed from a string: `all`, `favorites` and `recent` are reserved; anything
/// else names a list id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtworkFilter {
    All,
    Favorites,
    /// Newest first, capped at the configured recent limit.
    Recent,
    List(String),
}

impl ArtworkFilter {
    pub fn list(id: impl Into<String>) -> Self {
        ArtworkFilter::List(id.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ArtworkFilter::All => "all",
            ArtworkFilter::Favorites => "favorites",
            ArtworkFilter::Recent => "recent",
            ArtworkFilter::List(id) => id,
        }
    }
}

impl From<&str> for ArtworkFilter {
    fn from(value: &str) -> Self {
        match value {
            "all" => ArtworkFilter::All,
            "favorites" => ArtworkFilter::Favorites,
            "recent" => ArtworkFilter::Recent,
            other => ArtworkFilter::List(other.to_string()),
        }
    }
}

impl From<String> for ArtworkFilter {
    fn from(value: String) -> Self {
        match value.as_str() {
            "all" | "favorites" | "recent" => ArtworkFilter::from(value.as_str()),
            _ => ArtworkFilter::List(value),
        }
    }
}

impl FromStr for ArtworkFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ArtworkFilter::from(s))
    }
}

impl fmt::Display for ArtworkFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection totals shown on the profile screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub artworks: usize,
    pub lists: usize,
    pub favorites: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_parse_to_variants() {
        assert_eq!(ArtworkFilter::from("all"), ArtworkFilter::All);
        assert_eq!(ArtworkFilter::from("favorites"), ArtworkFilter::Favorites);
        assert_eq!("recent".parse::<ArtworkFilter>(), Ok(ArtworkFilter::Recent));
    }

    #[test]
    fn anything_else_is_a_list_id() {
        assert_eq!(
            ArtworkFilter::from("1714560000000".to_string()),
            ArtworkFilter::list("1714560000000")
        );
        // Matching is exact, not case-insensitive.
        assert_eq!(ArtworkFilter::from("All"), ArtworkFilter::list("All"));
    }

    #[test]
    fn display_round_trips() {
        for raw in ["all", "favorites", "recent", "list-7"] {
            assert_eq!(ArtworkFilter::from(raw).to_string(), raw);
        }
    }
}
