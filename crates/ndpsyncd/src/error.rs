//! Error types for ndpsyncd.
//!
//! The dispatcher itself is infallible for well-formed events; the errors
//! here cover collaborator lookups and daemon lifecycle misuse.

use crate::route_table::RouteEntry;
use thiserror::Error;

/// Errors that can occur in ndpsyncd.
#[derive(Debug, Error)]
pub enum NdpsyncError {
    /// A route removal did not match any installed route.
    ///
    /// The dispatcher absorbs this as a no-op; it is surfaced for
    /// collaborators that mutate the route table directly.
    #[error("route not found: {0}")]
    RouteNotFound(RouteEntry),

    /// The dispatcher worker was started more than once.
    #[error("dispatcher already started")]
    AlreadyStarted,

    /// Metrics registration failed.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for ndpsyncd operations.
pub type Result<T> = std::result::Result<T, NdpsyncError>;
