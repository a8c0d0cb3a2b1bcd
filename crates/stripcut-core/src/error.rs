//! Error types for stripcut-core

use thiserror::Error;

/// Errors raised by image construction and pixel operations
#[derive(Error, Debug)]
pub enum Error {
    /// Width or height is zero or too large to allocate
    #[error("cannot create a {width}x{height} image")]
    InvalidDimension { width: u32, height: u32 },

    /// A row or column index past the image edge
    #[error("index {index} outside 0..{len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Two images must share a depth
    #[error("depth mismatch: {0} bpp and {1} bpp")]
    IncompatibleDepths(u32, u32),

    /// The operation is not defined for this depth
    #[error("operation not available at {0} bpp")]
    UnsupportedDepth(u32),

    /// An argument is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
