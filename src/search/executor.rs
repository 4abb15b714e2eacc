//! Query execution against a resolved searcher

use super::models::SearchQuery;
use crate::error::{Result, SearchError};
use crate::metrics::Metrics;
use crate::results::RawResults;
use crate::searchers::Searcher;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Executes native queries against searchers
pub struct QueryExecutor {
    /// Metrics sink
    metrics: Arc<Metrics>,
}

impl QueryExecutor {
    /// Create a new query executor
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    /// Run a query with its skip/take window.
    ///
    /// Parse failures come back as [`SearchError::QueryParse`]; anything else
    /// the backend raises is passed through as-is.
    pub async fn execute(&self, searcher: &dyn Searcher, query: &SearchQuery) -> Result<RawResults> {
        let name = searcher.name();
        let start = Instant::now();

        debug!(
            "Executing '{}' on searcher {} (skip={}, take={})",
            query.term(),
            name,
            query.skip(),
            query.take()
        );

        self.metrics.record_query(name);
        let result = searcher.search(query).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(results) => {
                self.metrics.record_response_time(name, elapsed.as_millis() as u64);
                debug!(
                    "Searcher {} returned {} of {} results in {:?}",
                    name,
                    results.hits.len(),
                    results.total,
                    elapsed
                );
            }
            Err(SearchError::QueryParse(e)) => {
                self.metrics.record_parse_failure(name);
                info!("Rejected query on searcher {}: {}", name, e);
            }
            Err(e) => {
                self.metrics.record_backend_failure(name);
                error!("Searcher {} failed after {:?}: {}", name, elapsed, e);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searchers::memory::{MemoryDocument, MemorySearcher};

    #[tokio::test]
    async fn test_execute_records_metrics() {
        let metrics = Arc::new(Metrics::new());
        let executor = QueryExecutor::new(metrics.clone());
        let searcher = MemorySearcher::new(
            "content",
            vec![MemoryDocument::new("1").with_value("title", "hello")],
        );

        let ok = executor
            .execute(&searcher, &SearchQuery::new("hello", 0, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.total, 1);

        let err = executor
            .execute(&searcher, &SearchQuery::new("*hello", 0, 10).unwrap())
            .await;
        assert!(matches!(err, Err(SearchError::QueryParse(_))));

        let stats = metrics.get_searcher_stats();
        assert_eq!(stats["content"].queries, 2);
        assert_eq!(stats["content"].parse_failures, 1);
        assert_eq!(metrics.get_total_queries(), 2);
    }
}
