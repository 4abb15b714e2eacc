//! Searcher traits and types

use crate::error::Result;
use crate::results::RawResults;
use crate::search::SearchQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Backend kinds this crate can compose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Tantivy,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Tantivy => "tantivy",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named, already-initialized search index.
///
/// Implementations interpret the query term with the native grammar in
/// [`crate::query`] and apply the skip/take window themselves, so the total
/// reflects every match while only the window is materialized.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Searcher name (unique within a registry)
    fn name(&self) -> &str;

    /// Backend implementing this searcher
    fn backend(&self) -> BackendKind;

    /// Number of searchable documents, if cheaply known
    fn document_count(&self) -> Option<u64> {
        None
    }

    /// Execute a native query.
    ///
    /// Grammar violations are reported as [`crate::SearchError::QueryParse`],
    /// never as an empty result.
    async fn search(&self, query: &SearchQuery) -> Result<RawResults>;
}
