//! Settings structures for the gateway's settings.yml

use crate::searchers::memory::MemoryDocument;
use crate::searchers::BackendKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub search: SearchSettings,
    pub searchers: Vec<SearcherConfig>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Merge with environment variables (SEARCHER_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("SEARCHER_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("SEARCHER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SEARCHER_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("SEARCHER_MAX_TAKE") {
            if let Ok(max_take) = val.parse() {
                self.search.max_take = Some(max_take);
            }
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name reported by /health
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "searcher-gateway".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Query behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Upper bound for `take` on query requests; unset means no cap
    pub max_take: Option<u32>,
    /// Default page size when listing searchers
    pub list_take: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_take: None,
            list_take: 100,
        }
    }
}

/// Configuration for a single searcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearcherConfig {
    /// Name the searcher is registered under
    pub name: String,
    /// Backend implementation
    pub backend: BackendKind,
    /// Skip this searcher at startup
    pub disabled: bool,
    /// Index directory (tantivy)
    pub path: Option<PathBuf>,
    /// Stored field used as the hit id (tantivy)
    pub id_field: String,
    /// Inline documents (memory)
    pub documents: Vec<MemoryDocument>,
    /// JSON file with an array of documents (memory)
    pub documents_path: Option<PathBuf>,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            backend: BackendKind::Memory,
            disabled: false,
            path: None,
            id_field: "id".to_string(),
            documents: Vec::new(),
            documents_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.bind_address, "127.0.0.1");
        assert!(!settings.general.debug);
        assert_eq!(settings.search.max_take, None);
        assert_eq!(settings.search.list_take, 100);
        assert!(settings.searchers.is_empty());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
server:
  port: 9000
search:
  max_take: 50
searchers:
  - name: content
    documents:
      - id: "42"
        fields:
          title: Hello World
          tags: [a, b]
  - name: archive
    backend: tantivy
    path: /var/lib/archive
    id_field: key
    disabled: true
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.bind_address, "127.0.0.1");
        assert_eq!(settings.search.max_take, Some(50));

        let content = &settings.searchers[0];
        assert_eq!(content.name, "content");
        assert_eq!(content.backend, BackendKind::Memory);
        assert_eq!(content.id_field, "id");
        assert_eq!(content.documents[0].fields["title"], vec!["Hello World"]);
        assert_eq!(content.documents[0].fields["tags"], vec!["a", "b"]);

        let archive = &settings.searchers[1];
        assert_eq!(archive.name, "archive");
        assert!(archive.disabled);
        assert_eq!(archive.backend, BackendKind::Tantivy);
        assert_eq!(archive.id_field, "key");
        assert_eq!(archive.path.as_deref(), Some(Path::new("/var/lib/archive")));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");
        std::fs::write(&path, "general:\n  instance_name: test\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.general.instance_name, "test");

        assert!(Settings::from_file(dir.path().join("missing.yml")).is_err());
    }
}
