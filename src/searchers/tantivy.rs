//! Searcher backed by an on-disk Tantivy index
//!
//! The index is opened read-only; whoever builds it owns the schema. Every
//! indexed text field is searchable by default, and stored fields are
//! returned as string values.

use super::traits::{BackendKind, Searcher};
use crate::error::{Result, SearchError};
use crate::query::QueryParseError;
use crate::results::{FieldBag, RawHit, RawResults};
use crate::search::SearchQuery;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::QueryParser;
use tantivy::schema::{FieldType, Schema};
use tantivy::{Document as _, Index, IndexReader, TantivyDocument};
use tracing::debug;

/// Searcher over a Tantivy index
pub struct TantivySearcher {
    name: String,
    schema: Schema,
    reader: IndexReader,
    parser: QueryParser,
    /// Stored field holding the document identifier
    id_field: String,
}

impl TantivySearcher {
    /// Wrap an already-open index
    pub fn new(name: impl Into<String>, index: Index, id_field: impl Into<String>) -> anyhow::Result<Self> {
        let schema = index.schema();
        let default_fields = schema
            .fields()
            .filter(|(_, entry)| entry.is_indexed() && matches!(entry.field_type(), FieldType::Str(_)))
            .map(|(field, _)| field)
            .collect();
        let parser = QueryParser::for_index(&index, default_fields);
        let reader = index.reader().context("build index reader")?;

        Ok(Self {
            name: name.into(),
            schema,
            reader,
            parser,
            id_field: id_field.into(),
        })
    }

    /// Open an index directory
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>, id_field: impl Into<String>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let index = Index::open_in_dir(path)
            .with_context(|| format!("open tantivy index {}", path.display()))?;
        Self::new(name, index, id_field)
    }
}

/// Flatten a stored JSON value into display strings
fn json_strings(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::String(s) => vec![s.clone()],
        serde_json::Value::Array(arr) => arr.iter().flat_map(json_strings).collect(),
        other => vec![other.to_string()],
    }
}

fn to_field_bag(json: &str) -> anyhow::Result<FieldBag> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("decode stored document")?;
    match value {
        serde_json::Value::Object(map) => Ok(map
            .iter()
            .map(|(name, v)| (name.clone(), json_strings(v)))
            .collect()),
        other => Err(anyhow::anyhow!("stored document is not an object: {}", other)),
    }
}

#[async_trait]
impl Searcher for TantivySearcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Tantivy
    }

    fn document_count(&self) -> Option<u64> {
        Some(self.reader.searcher().num_docs())
    }

    async fn search(&self, query: &SearchQuery) -> Result<RawResults> {
        let term = query.term();
        // Shared grammar rules (leading wildcards) apply before Tantivy's own parser
        crate::query::parse(term)?;
        let parsed = self
            .parser
            .parse_query(term)
            .map_err(|e| QueryParseError::new(term, e.to_string()))?;

        let reader = self.reader.clone();
        let schema = self.schema.clone();
        let id_field = self.id_field.clone();
        let skip = query.skip() as u64;
        let take = query.take() as u64;

        let results = tokio::task::spawn_blocking(move || -> anyhow::Result<RawResults> {
            let searcher = reader.searcher();

            // TopDocs allocates limit + offset slots up front and rejects a zero limit
            let limit = take.min(searcher.num_docs().saturating_sub(skip));
            if limit == 0 {
                let total = searcher.search(&parsed, &Count)?;
                return Ok(RawResults {
                    total: total as u64,
                    hits: Vec::new(),
                });
            }

            let top = TopDocs::with_limit(limit as usize).and_offset(skip as usize);
            let (total, top_docs) = searcher.search(&parsed, &(Count, top))?;

            let mut hits = Vec::with_capacity(top_docs.len());
            for (score, addr) in top_docs {
                let doc = searcher.doc::<TantivyDocument>(addr)?;
                let fields = to_field_bag(&doc.to_json(&schema))?;
                let id = fields
                    .get(&id_field)
                    .and_then(|values| values.first().cloned())
                    .unwrap_or_else(|| format!("{}:{}", addr.segment_ord, addr.doc_id));
                hits.push(RawHit { id, score, fields });
            }

            Ok(RawResults {
                total: total as u64,
                hits,
            })
        })
        .await
        .context("search task panicked")
        .map_err(SearchError::Backend)??;

        debug!(
            "Tantivy searcher {} matched {} documents for '{}'",
            self.name, results.total, term
        );
        Ok(results)
    }
}
