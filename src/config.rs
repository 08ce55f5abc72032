//! Catalog configuration.

use std::path::PathBuf;

use crate::error::{CatalogError, Result};
use crate::kv::validate_key;

pub const DEFAULT_ARTWORKS_KEY: &str = "artworks";
pub const DEFAULT_LISTS_KEY: &str = "lists";
pub const DEFAULT_RECENT_LIMIT: usize = 10;

const ENV_PREFIX: &str = "GALLERY_CATALOG_";

/// Settings for a [`CollectionStore`](crate::CollectionStore).
///
/// `persist_empty` controls what happens when a collection becomes empty:
/// when true (the default) an empty snapshot is written so deleting the last
/// item sticks across restarts; when false the write is skipped and storage
/// keeps the previous non-empty snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub artworks_key: String,
    pub lists_key: String,
    pub recent_limit: usize,
    pub persist_empty: bool,
    /// Directory for [`FileKeyValueStore`](crate::FileKeyValueStore)-backed catalogs.
    pub data_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            artworks_key: DEFAULT_ARTWORKS_KEY.to_string(),
            lists_key: DEFAULT_LISTS_KEY.to_string(),
            recent_limit: DEFAULT_RECENT_LIMIT,
            persist_empty: true,
            data_dir: None,
        }
    }
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(
        mut self,
        artworks_key: impl Into<String>,
        lists_key: impl Into<String>,
    ) -> Self {
        self.artworks_key = artworks_key.into();
        self.lists_key = lists_key.into();
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    pub fn with_persist_empty(mut self, persist_empty: bool) -> Self {
        self.persist_empty = persist_empty;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Read overrides from `GALLERY_CATALOG_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));
        let mut config = Self::default();

        if let Some(key) = var("ARTWORKS_KEY") {
            config.artworks_key = key;
        }
        if let Some(key) = var("LISTS_KEY") {
            config.lists_key = key;
        }
        if let Some(raw) = var("RECENT_LIMIT") {
            config.recent_limit = raw.trim().parse().map_err(|_| {
                CatalogError::config("recent_limit", format!("not an integer: {:?}", raw))
            })?;
        }
        if let Some(raw) = var("PERSIST_EMPTY") {
            config.persist_empty = parse_bool(&raw).ok_or_else(|| {
                CatalogError::config("persist_empty", format!("not a boolean: {:?}", raw))
            })?;
        }
        if let Some(dir) = var("DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the store relies on.
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.artworks_key)
            .map_err(|e| CatalogError::config("artworks_key", e.to_string()))?;
        validate_key(&self.lists_key)
            .map_err(|e| CatalogError::config("lists_key", e.to_string()))?;
        if self.artworks_key == self.lists_key {
            return Err(CatalogError::config("lists_key", "must differ from artworks_key"));
        }
        if self.recent_limit == 0 {
            return Err(CatalogError::config("recent_limit", "must be at least 1"));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_mobile_app_keys() {
        let config = CatalogConfig::default();
        assert_eq!(config.artworks_key, "artworks");
        assert_eq!(config.lists_key, "lists");
        assert_eq!(config.recent_limit, 10);
        assert!(config.persist_empty);
        config.validate().unwrap();
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("GALLERY_CATALOG_ARTWORKS_KEY", "art-v2"),
            ("GALLERY_CATALOG_RECENT_LIMIT", " 25 "),
            ("GALLERY_CATALOG_PERSIST_EMPTY", "off"),
            ("GALLERY_CATALOG_DATA_DIR", "/var/lib/catalog"),
        ]))
        .unwrap();

        assert_eq!(config.artworks_key, "art-v2");
        assert_eq!(config.lists_key, "lists");
        assert_eq!(config.recent_limit, 25);
        assert!(!config.persist_empty);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/catalog")));
    }

    #[test]
    fn rejects_bad_values() {
        let err = CatalogConfig::from_lookup(lookup(&[("GALLERY_CATALOG_RECENT_LIMIT", "ten")]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Config { ref name, .. } if name == "recent_limit"));

        let err = CatalogConfig::from_lookup(lookup(&[("GALLERY_CATALOG_PERSIST_EMPTY", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Config { ref name, .. } if name == "persist_empty"));
    }

    #[test]
    fn keys_must_be_distinct_and_safe() {
        assert!(CatalogConfig::new().with_keys("same", "same").validate().is_err());
        assert!(CatalogConfig::new().with_keys("../a", "b").validate().is_err());
        assert!(CatalogConfig::new().with_recent_limit(0).validate().is_err());
    }
}
