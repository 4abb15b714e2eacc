//! Metrics collection module
//!
//! Tracks per-searcher query volume, latency and rejected queries.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Rolling window of response times kept per searcher
const RESPONSE_TIME_WINDOW: usize = 100;

/// Global metrics collector
pub struct Metrics {
    /// Total executed queries
    total_queries: AtomicU64,
    /// Lookups for unregistered searcher names
    not_found: AtomicU64,
    /// Queries per searcher
    searcher_queries: RwLock<HashMap<String, u64>>,
    /// Searcher response times (last N, in ms)
    response_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Queries rejected by the grammar
    parse_failures: RwLock<HashMap<String, u64>>,
    /// Backend faults
    backend_failures: RwLock<HashMap<String, u64>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_queries: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            searcher_queries: RwLock::new(HashMap::new()),
            response_times: RwLock::new(HashMap::new()),
            parse_failures: RwLock::new(HashMap::new()),
            backend_failures: RwLock::new(HashMap::new()),
        }
    }

    /// Record a query executed on a searcher
    pub fn record_query(&self, searcher: &str) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        increment(&self.searcher_queries, searcher);
    }

    /// Record a lookup for an unknown searcher
    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a query rejected by the grammar
    pub fn record_parse_failure(&self, searcher: &str) {
        increment(&self.parse_failures, searcher);
    }

    /// Record a backend fault
    pub fn record_backend_failure(&self, searcher: &str) {
        increment(&self.backend_failures, searcher);
    }

    /// Record searcher response time
    pub fn record_response_time(&self, searcher: &str, time_ms: u64) {
        let Ok(mut times) = self.response_times.write() else {
            return;
        };
        let entry = times.entry(searcher.to_string()).or_default();

        if entry.len() >= RESPONSE_TIME_WINDOW {
            entry.remove(0);
        }
        entry.push(time_ms);
    }

    /// Get total queries
    pub fn get_total_queries(&self) -> u64 {
        self.total_queries.load(Ordering::Relaxed)
    }

    /// Get unknown-searcher lookups
    pub fn get_not_found(&self) -> u64 {
        self.not_found.load(Ordering::Relaxed)
    }

    /// Get average response time for a searcher
    pub fn get_avg_response_time(&self, searcher: &str) -> Option<u64> {
        let times = self.response_times.read().ok()?;
        times.get(searcher).and_then(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.iter().sum::<u64>() / t.len() as u64)
            }
        })
    }

    /// Get statistics for every searcher that received a query
    pub fn get_searcher_stats(&self) -> HashMap<String, SearcherStats> {
        let queries = snapshot(&self.searcher_queries);
        let parse_failures = snapshot(&self.parse_failures);
        let backend_failures = snapshot(&self.backend_failures);

        queries
            .into_iter()
            .map(|(name, count)| {
                let stats = SearcherStats {
                    queries: count,
                    parse_failures: parse_failures.get(&name).copied().unwrap_or(0),
                    backend_failures: backend_failures.get(&name).copied().unwrap_or(0),
                    avg_response_time: self.get_avg_response_time(&name),
                };
                (name, stats)
            })
            .collect()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn increment(map: &RwLock<HashMap<String, u64>>, key: &str) {
    if let Ok(mut map) = map.write() {
        *map.entry(key.to_string()).or_insert(0) += 1;
    }
}

fn snapshot(map: &RwLock<HashMap<String, u64>>) -> HashMap<String, u64> {
    map.read().map(|m| m.clone()).unwrap_or_default()
}

/// Statistics for a single searcher
#[derive(Debug, Clone, Serialize)]
pub struct SearcherStats {
    pub queries: u64,
    pub parse_failures: u64,
    pub backend_failures: u64,
    /// Milliseconds, over the last 100 successful queries
    pub avg_response_time: Option<u64>,
}
