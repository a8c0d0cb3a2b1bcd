//! Error types for stripcut-test

use thiserror::Error;

/// Errors raised by the regression harness and the strip builders
#[derive(Debug, Error)]
pub enum TestError {
    /// A display-mode image could not be written
    #[error("cannot write '{path}': {message}")]
    ImageWrite { path: String, message: String },

    /// A synthetic strip could not be built
    #[error("synthetic strip: {0}")]
    Synth(#[from] stripcut_core::Error),

    /// Filesystem error in the output directory
    #[error("regout: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for harness operations
pub type TestResult<T> = Result<T, TestError>;
