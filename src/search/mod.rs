//! Search orchestration module
//!
//! Validates query input, resolves the target searcher, executes the
//! native query and projects the results into a page.

mod dispatch;
mod executor;
mod models;

pub use dispatch::QueryDispatcher;
pub use executor::QueryExecutor;
pub use models::*;
