//! Error types for stripcut-fetch

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching panel images
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body is not a decodable PNG or JPEG
    #[error("decode error: {0}")]
    Decode(#[from] stripcut_io::IoError),

    /// Core library error while normalizing a panel
    #[error("core error: {0}")]
    Core(#[from] stripcut_core::Error),

    /// Writing a staged fragment failed
    #[error("failed to stage '{}': {message}", path.display())]
    Staging { path: PathBuf, message: String },

    /// A bounded retry policy ran out of attempts
    #[error("panel {index} ({url}) failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        index: u32,
        url: String,
        attempts: u32,
        last_error: Box<FetchError>,
    },

    /// Invalid fetch options
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// A fetch task panicked or was cancelled
    #[error("fetch task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Whether the same request may succeed if tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Http(_) | FetchError::Status { .. } | FetchError::Decode(_)
        )
    }
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
