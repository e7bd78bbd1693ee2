//! Error types shared by the table builders and the binary codec.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while compiling a topology into forwarding tables
#[derive(Debug, Error)]
pub enum RouteError {
    /// Topology source could not be found (raised by the loader, never by the core)
    #[error("Input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Topology is inconsistent with what the routing algorithms require
    #[error("Malformed topology: {0}")]
    MalformedTopology(String),

    /// A table buffer could not be sized or allocated
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Internal invariant violated while serializing a table
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// A byte stream does not follow the documented layout
    #[error("Decoding failed: {0}")]
    DecodingFailed(String),
}

impl RouteError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedTopology(msg.into())
    }

    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        Self::EncodingFailed(msg.into())
    }
}

impl From<std::io::Error> for RouteError {
    // Writes go to in-memory buffers, so an I/O error here is always an encoder bug
    fn from(err: std::io::Error) -> Self {
        Self::EncodingFailed(err.to_string())
    }
}

/// Result type alias for routing and encoding operations
pub type Result<T> = std::result::Result<T, RouteError>;
