//! searcher-gateway: query dispatch over named full-text searchers
//!
//! Resolves a searcher by name, runs a native Lucene-style query against it
//! with a skip/take window, and projects the hits into a stable page shape
//! with fields ordered by name.

pub mod config;
pub mod error;
pub mod metrics;
pub mod query;
pub mod results;
pub mod search;
pub mod searchers;
pub mod web;

pub use config::Settings;
pub use error::SearchError;
pub use results::{SearchHit, SearchResultPage};
pub use search::{QueryDispatcher, SearchQuery};
pub use searchers::{Searcher, SearcherRegistry};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
