//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::search::QueryDispatcher;
use crate::searchers::SearcherRegistry;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Searcher registry
    pub registry: Arc<SearcherRegistry>,
    /// Query dispatcher
    pub dispatcher: Arc<QueryDispatcher>,
    /// Metrics collector
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, registry: SearcherRegistry) -> Self {
        let settings = Arc::new(settings);
        let registry = Arc::new(registry);
        let metrics = Arc::new(Metrics::new());
        let dispatcher = QueryDispatcher::new(registry.clone(), metrics.clone())
            .with_max_take(settings.search.max_take);

        Self {
            settings,
            registry,
            dispatcher: Arc::new(dispatcher),
            metrics,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
