//! Error types for query execution

use crate::query::QueryParseError;
use thiserror::Error;

/// Failures of the query path.
///
/// `SearcherNotFound` and `QueryParse` are caused by caller input and never
/// succeed on resubmission. `Backend` carries any other fault untouched.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no searcher registered under '{name}'")]
    SearcherNotFound { name: String },

    #[error(transparent)]
    QueryParse(#[from] QueryParseError),

    #[error("searcher backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

impl SearchError {
    pub fn searcher_not_found(name: impl Into<String>) -> Self {
        Self::SearcherNotFound { name: name.into() }
    }

    /// Whether the failure is a client input error
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::SearcherNotFound { .. } | Self::QueryParse(_))
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
