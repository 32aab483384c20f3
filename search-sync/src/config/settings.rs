//! Environment settings.

use std::env;
use std::path::PathBuf;

use crate::AppError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default collections file.
const DEFAULT_COLLECTIONS_CONFIG: &str = "collections.json";

/// Default directory of JSON-lines record files.
const DEFAULT_DATA_DIR: &str = "data";

const DEFAULT_IMPORT_PAGE_SIZE: usize = 500;

const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub opensearch_url: String,
    pub collections_config: PathBuf,
    /// Index-name prefix; overrides the collections file's prefix when set.
    pub collection_prefix: Option<String>,
    pub data_dir: PathBuf,
    pub import_page_size: usize,
    pub max_batch_size: usize,
}

impl SyncConfig {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `COLLECTIONS_CONFIG`: collections file (default: collections.json)
    /// - `COLLECTION_PREFIX`: index-name prefix (default: the file's prefix)
    /// - `DATA_DIR`: JSON-lines record directory (default: data)
    /// - `IMPORT_PAGE_SIZE`: records per import batch (default: 500)
    /// - `MAX_BATCH_SIZE`: largest batch sent to the engine (default: 1000)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let config = Self {
            opensearch_url: lookup("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            collections_config: lookup("COLLECTIONS_CONFIG")
                .unwrap_or_else(|| DEFAULT_COLLECTIONS_CONFIG.to_string())
                .into(),
            collection_prefix: lookup("COLLECTION_PREFIX"),
            data_dir: lookup("DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            import_page_size: parse_size(&lookup, "IMPORT_PAGE_SIZE", DEFAULT_IMPORT_PAGE_SIZE)?,
            max_batch_size: parse_size(&lookup, "MAX_BATCH_SIZE", DEFAULT_MAX_BATCH_SIZE)?,
        };

        if config.import_page_size > config.max_batch_size {
            return Err(AppError::config(format!(
                "IMPORT_PAGE_SIZE ({}) exceeds MAX_BATCH_SIZE ({})",
                config.import_page_size, config.max_batch_size
            )));
        }

        Ok(config)
    }
}

fn parse_size(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize, AppError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(0) | Err(_) => Err(AppError::config(format!(
                "{} must be a positive integer, got '{}'",
                key, raw
            ))),
            Ok(size) => Ok(size),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.opensearch_url, "http://localhost:9200");
        assert_eq!(config.collections_config, PathBuf::from("collections.json"));
        assert_eq!(config.collection_prefix, None);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.import_page_size, 500);
        assert_eq!(config.max_batch_size, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("OPENSEARCH_URL", "http://search:9200"),
            ("COLLECTION_PREFIX", "staging_"),
            ("IMPORT_PAGE_SIZE", "50"),
        ]))
        .unwrap();

        assert_eq!(config.opensearch_url, "http://search:9200");
        assert_eq!(config.collection_prefix.as_deref(), Some("staging_"));
        assert_eq!(config.import_page_size, 50);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(SyncConfig::from_lookup(lookup(&[("IMPORT_PAGE_SIZE", "0")])).is_err());
        assert!(SyncConfig::from_lookup(lookup(&[("IMPORT_PAGE_SIZE", "many")])).is_err());
        assert!(SyncConfig::from_lookup(lookup(&[
            ("IMPORT_PAGE_SIZE", "2000"),
            ("MAX_BATCH_SIZE", "1000"),
        ]))
        .is_err());
    }
}
