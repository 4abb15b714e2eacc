//! Result types and projection of backend hits into pages
//!
//! Backends hand back a loosely ordered field bag per hit; everything that
//! leaves this crate goes through [`project`] so callers always see field
//! names in ascending order.

mod projector;
mod types;

pub use projector::project;
pub use types::*;
