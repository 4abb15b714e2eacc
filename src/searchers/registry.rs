//! Searcher registry for resolving searchers by name

use super::traits::Searcher;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of all available searchers.
///
/// Built at composition time and shared immutably afterwards, so lookups
/// from concurrent requests need no locking.
pub struct SearcherRegistry {
    searchers: HashMap<String, Arc<dyn Searcher>>,
}

impl SearcherRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            searchers: HashMap::new(),
        }
    }

    /// Register a searcher, returning the one it replaced
    pub fn register(&mut self, searcher: Arc<dyn Searcher>) -> Option<Arc<dyn Searcher>> {
        let name = searcher.name().to_string();
        self.searchers.insert(name, searcher)
    }

    /// Resolve a searcher by exact name
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Searcher>> {
        self.searchers.get(name).cloned()
    }

    /// Check if a searcher exists
    pub fn contains(&self, name: &str) -> bool {
        self.searchers.contains_key(name)
    }

    /// All searcher names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.searchers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// All searchers, sorted by name
    pub fn searchers(&self) -> Vec<&Arc<dyn Searcher>> {
        let mut searchers: Vec<&Arc<dyn Searcher>> = self.searchers.values().collect();
        searchers.sort_by(|a, b| a.name().cmp(b.name()));
        searchers
    }

    /// Get number of registered searchers
    pub fn len(&self) -> usize {
        self.searchers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.searchers.is_empty()
    }
}

impl Default for SearcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}
