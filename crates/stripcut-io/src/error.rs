//! I/O error types
//!
//! Every codec maps its library errors into [`IoError`].

use thiserror::Error;

/// Errors raised while reading or writing images
#[derive(Error, Debug)]
pub enum IoError {
    /// Reading or writing the underlying file failed
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither PNG nor JPEG, or the codec feature is disabled
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The header or layout is malformed
    #[error("malformed image: {0}")]
    InvalidData(String),

    /// The codec rejected the data
    #[error("cannot decode: {0}")]
    DecodeError(String),

    /// The image exceeds what the target format can encode
    #[error("{width}x{height} image exceeds the {format} limit of {limit} pixels per side")]
    TooLarge {
        format: &'static str,
        width: u32,
        height: u32,
        limit: u32,
    },

    /// The codec failed to encode
    #[error("cannot encode: {0}")]
    EncodeError(String),

    /// Pixel conversion failed
    #[error(transparent)]
    Core(#[from] stripcut_core::Error),
}

/// Result alias for image I/O
pub type IoResult<T> = Result<T, IoError>;
