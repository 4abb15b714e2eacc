//! Query dispatch: the entry point for one search request

use super::executor::QueryExecutor;
use super::models::SearchQuery;
use crate::error::{Result, SearchError};
use crate::metrics::Metrics;
use crate::results::{project, SearchResultPage};
use crate::searchers::SearcherRegistry;
use std::sync::Arc;
use tracing::debug;

/// Routes a term to a named searcher and shapes the outcome.
///
/// Holds no per-request state; one instance serves all requests.
pub struct QueryDispatcher {
    registry: Arc<SearcherRegistry>,
    executor: QueryExecutor,
    metrics: Arc<Metrics>,
    /// Upper bound for `take`; `None` leaves it to the caller
    max_take: Option<u32>,
}

impl QueryDispatcher {
    /// Create a new dispatcher
    pub fn new(registry: Arc<SearcherRegistry>, metrics: Arc<Metrics>) -> Self {
        Self {
            registry,
            executor: QueryExecutor::new(metrics.clone()),
            metrics,
            max_take: None,
        }
    }

    /// Cap the number of hits a single request may ask for
    pub fn with_max_take(mut self, max_take: Option<u32>) -> Self {
        self.max_take = max_take;
        self
    }

    /// Get the registry this dispatcher resolves against
    pub fn registry(&self) -> &Arc<SearcherRegistry> {
        &self.registry
    }

    /// Run one query request.
    ///
    /// A missing or blank term yields an empty page without resolving the
    /// searcher. Unknown searchers and unparsable terms are returned as
    /// errors; neither is retried.
    pub async fn query(
        &self,
        searcher_name: &str,
        term: Option<&str>,
        skip: u32,
        take: u32,
    ) -> Result<SearchResultPage> {
        let Some(mut query) = term.and_then(|t| SearchQuery::new(t, skip, take)) else {
            debug!("Blank term for searcher {}, returning empty page", searcher_name);
            return Ok(SearchResultPage::empty());
        };

        let Some(searcher) = self.registry.resolve(searcher_name) else {
            self.metrics.record_not_found();
            return Err(SearchError::searcher_not_found(searcher_name));
        };

        if let Some(max_take) = self.max_take {
            query = query.with_max_take(max_take);
        }

        let results = self.executor.execute(searcher.as_ref(), &query).await?;
        Ok(project(results))
    }
}
