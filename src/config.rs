//! Service configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::schema::IndexSchema;
use crate::embedding::DEFAULT_DIMENSION;
use crate::error::{AlexandriaError, Result};

fn default_index_name() -> String {
    "books".to_string()
}

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}

fn default_k() -> usize {
    10
}

fn default_num_candidates() -> usize {
    100
}

fn default_page_size() -> usize {
    10
}

/// Top-level configuration for the discovery core.
///
/// Loaded from TOML; every section and key is optional and falls back to its
/// default. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub index: IndexSettings,
    pub search: SearchSettings,
    pub bootstrap: BootstrapSettings,
}

/// Catalog index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    #[serde(rename = "name")]
    pub index_name: String,
    pub dimension: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            dimension: default_dimension(),
        }
    }
}

/// Query sizing knobs shared by the four search modes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Top-k for vector queries.
    pub k: usize,
    /// Candidate pool for approximate vector search.
    pub num_candidates: usize,
    /// Result window for filter and popularity queries.
    pub page_size: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            k: default_k(),
            num_candidates: default_num_candidates(),
            page_size: default_page_size(),
        }
    }
}

/// Cold-start settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    /// URL of the one-shot bulk feed, when cold start pulls over HTTP.
    pub feed_url: Option<String>,
}

impl DiscoveryConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| AlexandriaError::config(err.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            AlexandriaError::config(format!(
                "failed to read {}: {err}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    /// The index mapping this configuration describes.
    pub fn index_schema(&self) -> IndexSchema {
        IndexSchema::books(&self.index.index_name, self.index.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_query_contract() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.index.index_name, "books");
        assert_eq!(config.index.dimension, 384);
        assert_eq!(config.search.k, 10);
        assert_eq!(config.search.num_candidates, 100);
        assert_eq!(config.search.page_size, 10);
        assert!(config.bootstrap.feed_url.is_none());
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config = DiscoveryConfig::from_toml_str(
            r#"
            [index]
            name = "catalog"

            [search]
            k = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.index.index_name, "catalog");
        assert_eq!(config.index.dimension, 384);
        assert_eq!(config.search.k, 5);
        assert_eq!(config.search.num_candidates, 100);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = DiscoveryConfig::from_toml_str(
            r#"
            [index]
            name = "books"
            replicas = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.index.index_name, "books");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            DiscoveryConfig::from_toml_str("[index\nname="),
            Err(AlexandriaError::Config(_))
        ));
    }

    #[test]
    fn from_path_loads_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discovery.toml");
        std::fs::write(&path, "[bootstrap]\nfeed_url = \"https://example.com/books.json\"\n")
            .unwrap();
        let config = DiscoveryConfig::from_path(&path).unwrap();
        assert_eq!(
            config.bootstrap.feed_url.as_deref(),
            Some("https://example.com/books.json")
        );
    }

    #[test]
    fn index_schema_uses_configured_name_and_dimension() {
        let mut config = DiscoveryConfig::default();
        config.index.index_name = "catalog".to_string();
        config.index.dimension = 8;
        let schema = config.index_schema();
        assert_eq!(schema.name, "catalog");
        assert_eq!(schema.vector_dims("summary_vector"), Some(8));
    }
}
