//! Searcher loader for building the registry from configuration

use super::memory::{self, MemorySearcher};
use super::registry::SearcherRegistry;
use super::tantivy::TantivySearcher;
use super::traits::{BackendKind, Searcher};
use crate::config::{SearcherConfig, Settings};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing searchers from configuration
pub struct SearcherLoader;

impl SearcherLoader {
    /// Load all searchers from settings.
    ///
    /// A searcher that fails to open is logged and left out; the rest still load.
    pub fn load(settings: &Settings) -> Result<SearcherRegistry> {
        let mut registry = SearcherRegistry::new();

        for config in &settings.searchers {
            if config.disabled {
                info!("Skipping disabled searcher: {}", config.name);
                continue;
            }

            match Self::create_searcher(config) {
                Ok(searcher) => {
                    info!("Loaded searcher: {} ({})", config.name, config.backend);
                    if registry.register(searcher).is_some() {
                        warn!("Searcher {} configured more than once, keeping the last", config.name);
                    }
                }
                Err(e) => {
                    warn!("Failed to load searcher {}: {:#}", config.name, e);
                }
            }
        }

        info!("Loaded {} searchers", registry.len());
        Ok(registry)
    }

    /// Create a searcher instance from its configuration
    pub fn create_searcher(config: &SearcherConfig) -> Result<Arc<dyn Searcher>> {
        if config.name.trim().is_empty() {
            anyhow::bail!("searcher name must not be empty");
        }

        let searcher: Arc<dyn Searcher> = match config.backend {
            BackendKind::Memory => {
                let mut documents = config.documents.clone();
                if let Some(path) = &config.documents_path {
                    documents.extend(memory::read_documents(path)?);
                }
                Arc::new(MemorySearcher::new(&config.name, documents))
            }
            BackendKind::Tantivy => {
                let path = config
                    .path
                    .as_ref()
                    .context("tantivy searcher requires a path")?;
                Arc::new(TantivySearcher::open(&config.name, path, &config.id_field)?)
            }
        };

        Ok(searcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searchers::memory::MemoryDocument;

    fn memory(name: &str) -> SearcherConfig {
        SearcherConfig {
            name: name.to_string(),
            documents: vec![MemoryDocument::new("1").with_value("title", "hello")],
            ..Default::default()
        }
    }

    #[test]
    fn test_load_skips_disabled_and_broken() {
        let settings = Settings {
            searchers: vec![
                memory("content"),
                SearcherConfig {
                    disabled: true,
                    ..memory("hidden")
                },
                SearcherConfig {
                    name: "archive".to_string(),
                    backend: BackendKind::Tantivy,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let registry = SearcherLoader::load(&settings).unwrap();
        assert_eq!(registry.names(), vec!["content"]);
    }

    #[test]
    fn test_documents_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(&path, r#"[{"id": "2", "fields": {"title": "from file"}}]"#).unwrap();

        let config = SearcherConfig {
            documents_path: Some(path),
            ..memory("content")
        };
        let searcher = SearcherLoader::create_searcher(&config).unwrap();
        assert_eq!(searcher.document_count(), Some(2));
        assert_eq!(searcher.backend(), BackendKind::Memory);
    }

    #[test]
    fn test_missing_documents_file_fails() {
        let config = SearcherConfig {
            documents_path: Some("/nonexistent/docs.json".into()),
            ..memory("content")
        };
        assert!(SearcherLoader::create_searcher(&config).is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(SearcherLoader::create_searcher(&memory("  ")).is_err());
    }
}
