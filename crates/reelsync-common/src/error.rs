//! Common error types used throughout reelsync.
//!
//! This module provides a unified error type that covers the failure classes
//! of a sync run: unreachable file servers, malformed listings, and database
//! failures.

/// Common error type for reelsync.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// A request to the file server or an integration failed.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The file-server listing or a metadata document has an unexpected shape.
    #[error("Malformed listing: {0}")]
    MalformedListing(String),

    /// A JSON document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Fetch error.
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new MalformedListing error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedListing(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
