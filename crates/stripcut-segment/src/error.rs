//! Error types for stripcut-segment

use thiserror::Error;

/// Errors that can occur while building a canvas from fragments
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// No fragments were supplied
    #[error("no panel fragments to assemble")]
    Empty,

    /// A fragment has a zero dimension
    #[error("fragment {index} has zero size ({width}x{height})")]
    ZeroSized { index: u32, width: u32, height: u32 },

    /// Two fragments claim the same index
    #[error("duplicate fragment index {0}")]
    DuplicateIndex(u32),

    /// The stacked height does not fit in a single image
    #[error("assembled height {0} exceeds the maximum image height")]
    TooTall(u64),

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] stripcut_core::Error),
}

/// Errors that can occur during segmentation
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] stripcut_core::Error),

    /// Encoding a segment failed
    #[error("image I/O error: {0}")]
    Image(#[from] stripcut_io::IoError),

    /// Creating the output location failed
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// Invalid segmentation parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Canvas assembly failed
    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),
}

/// Result type for segmentation operations
pub type SegmentResult<T> = Result<T, SegmentError>;
