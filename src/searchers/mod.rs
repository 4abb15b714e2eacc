//! Searcher module
//!
//! Defines the Searcher trait, its backends, and the registry that
//! resolves searchers by name.

mod loader;
mod registry;
mod traits;

// Backends
pub mod memory;
pub mod tantivy;

pub use loader::SearcherLoader;
pub use registry::SearcherRegistry;
pub use traits::*;
