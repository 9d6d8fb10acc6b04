//! Error types for sunfeed_feed
//!
//! None of these abort the feed. Each one maps to a reduced-but-visible
//! fallback at the call site.

use thiserror::Error;

/// Errors that can occur while building or interacting with the feed
#[derive(Error, Debug)]
pub enum FeedError {
    /// A prefab slot the presenter expected is not present
    #[error("Missing asset: {0}")]
    MissingAsset(String),

    /// The content provider produced no usable posts
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    /// A post record failed validation
    #[error("Malformed post record: {0}")]
    MalformedRecord(String),

    /// Like state could not be written
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// Configuration file could not be parsed or holds invalid values
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for sunfeed_feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
