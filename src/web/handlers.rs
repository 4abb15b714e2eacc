//! HTTP request handlers

use super::error::ApiError;
use super::state::AppState;
use crate::results::SearchResultPage;
use crate::searchers::BackendKind;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

/// Query parameters for a searcher query
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// Native query text
    pub term: Option<String>,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub take: u32,
}

/// Paging parameters for the searcher listing
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: u32,
    pub take: Option<u32>,
}

/// One registered searcher
#[derive(Debug, Serialize, Deserialize)]
pub struct SearcherSummary {
    pub name: String,
    pub backend: BackendKind,
}

/// Paged searcher listing
#[derive(Debug, Serialize, Deserialize)]
pub struct SearcherList {
    pub total: u64,
    pub items: Vec<SearcherSummary>,
}

/// Run a query against a named searcher
pub async fn query(
    State(state): State<AppState>,
    Path(searcher_name): Path<String>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<SearchResultPage>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidParameters(e.body_text()))?;

    let page = state
        .dispatcher
        .query(&searcher_name, params.term.as_deref(), params.skip, params.take)
        .await?;
    Ok(Json(page))
}

/// List registered searchers, sorted by name
pub async fn list_searchers(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<SearcherList>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidParameters(e.body_text()))?;
    let take = params.take.unwrap_or(state.settings.search.list_take);

    let searchers = state.registry.searchers();
    let items = searchers
        .iter()
        .skip(params.skip as usize)
        .take(take as usize)
        .map(|s| SearcherSummary {
            name: s.name().to_string(),
            backend: s.backend(),
        })
        .collect();

    Ok(Json(SearcherList {
        total: searchers.len() as u64,
        items,
    }))
}

/// Stats handler
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "instance_name": state.instance_name(),
        "searcher_count": state.registry.len(),
        "total_queries": state.metrics.get_total_queries(),
        "not_found": state.metrics.get_not_found(),
        "searchers": state.metrics.get_searcher_stats(),
    }))
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
