//! Problem-details responses for failed requests

use crate::error::SearchError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Errors a handler can answer with
#[derive(Debug)]
pub enum ApiError {
    Search(SearchError),
    /// Query string could not be read (non-numeric or negative skip/take)
    InvalidParameters(String),
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

/// Problem details body
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProblemDetails {
    pub title: String,
    pub detail: String,
    pub status: u16,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ProblemDetails {
    fn new(status: StatusCode, kind: &str, title: &str, detail: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            detail: detail.into(),
            status: status.as_u16(),
            kind: kind.to_string(),
        }
    }
}

impl ApiError {
    /// Problem body for this error
    pub fn problem(&self) -> ProblemDetails {
        match self {
            Self::Search(SearchError::SearcherNotFound { .. }) => ProblemDetails::new(
                StatusCode::NOT_FOUND,
                "SearcherNotFound",
                "Could not find a valid searcher",
                "The provided searcher name did not match any of our registered searchers",
            ),
            Self::Search(SearchError::QueryParse(_)) => ProblemDetails::new(
                StatusCode::BAD_REQUEST,
                "QueryParseFailure",
                "Could not parse the query",
                "Parser could not parse the query. Please double check if the query is valid. \
                 Sometimes this can also happen if your query starts with a wildcard (*)",
            ),
            Self::Search(SearchError::Backend(_)) => ProblemDetails::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "BackendFailure",
                "Search failed",
                "The searcher could not complete the query",
            ),
            Self::InvalidParameters(detail) => ProblemDetails::new(
                StatusCode::BAD_REQUEST,
                "InvalidParameters",
                "Invalid query parameters",
                detail.clone(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Search(e) if !e.is_client_error() => error!("Search failed: {:#}", e),
            Self::Search(e) => debug!("Rejected search request: {}", e),
            Self::InvalidParameters(detail) => debug!("Invalid query parameters: {}", detail),
        }

        let problem = self.problem();
        let status = StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)], Json(problem)).into_response()
    }
}
