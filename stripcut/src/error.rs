//! Error types for the stripcut driver

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end the processing of one chapter
#[derive(Debug, Error)]
pub enum ChapterError {
    /// Fetching the chapter's panels failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] stripcut_fetch::FetchError),

    /// The panels could not be stacked into a canvas
    #[error("assembly failed: {0}")]
    Assembly(#[from] stripcut_segment::AssemblyError),

    /// Segmenting or writing segments failed
    #[error("segmentation failed: {0}")]
    Segment(#[from] stripcut_segment::SegmentError),

    /// A local panel image could not be read
    #[error("cannot read '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        source: stripcut_io::IoError,
    },

    /// Filesystem error on a staging or output path
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The chapter has no panels to process
    #[error("no panels in {0}")]
    NoPanels(String),
}

/// Result type for chapter processing
pub type ChapterResult<T> = Result<T, ChapterError>;

/// Errors in configuration and manifest files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid TOML for its schema
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range or unknown
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
