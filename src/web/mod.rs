//! Web server module
//!
//! Provides the HTTP API over the searcher registry.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ProblemDetails};
pub use routes::create_router;
pub use state::AppState;
