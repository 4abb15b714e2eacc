//! Result type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stored field values of one document as reported by a backend.
///
/// Iteration order is whatever the backend produced and must not reach
/// callers; use [`super::project`] to obtain an ordered view.
pub type FieldBag = HashMap<String, Vec<String>>;

/// One document matched by a backend, before projection
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    /// Backend document identifier
    pub id: String,
    /// Backend relevance score
    pub score: f32,
    /// Stored fields
    pub fields: FieldBag,
}

impl RawHit {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            fields: FieldBag::new(),
        }
    }

    /// Append a value to a field, creating the field if needed
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.entry(name.into()).or_default().push(value.into());
        self
    }
}

/// Windowed result set returned by a backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResults {
    /// Total matches before the skip/take window was applied
    pub total: u64,
    /// Hits inside the window, in backend relevance order
    pub hits: Vec<RawHit>,
}

/// A named field and its values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues {
    pub name: String,
    pub values: Vec<String>,
}

/// A projected search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    /// Sorted by name, ascending
    pub fields: Vec<FieldValues>,
}

impl SearchHit {
    /// Look up a field's values by name
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields
            .binary_search_by(|f| f.name.as_str().cmp(name))
            .ok()
            .map(|i| self.fields[i].values.as_slice())
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultPage {
    /// Total matches irrespective of the pagination window
    pub total: u64,
    pub items: Vec<SearchHit>,
}

impl SearchResultPage {
    /// The page returned for a blank term
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
