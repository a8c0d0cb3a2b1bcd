//! stripcut - Long-strip comic segmentation
//!
//! Fetches the panel images of a long-strip (vertical scroll) comic,
//! stacks them into one canvas and cuts that canvas into page-sized
//! segments at the gutters between panels.
//!
//! # Overview
//!
//! - [`segment`]: canvas assembly and gutter segmentation
//! - [`fetch`]: concurrent panel download with retry
//! - [`io`]: PNG / JPEG reading and writing
//! - [`chapter`]: per-chapter driver, staging and output layout
//! - [`config`] and [`manifest`]: TOML inputs of the `stripcut` binary
//!
//! # Example
//!
//! ```
//! use stripcut::segment::{Background, GutterSegmenter, MemorySink, PanelFragment, assemble};
//! use stripcut::{PixMut, PixelDepth};
//!
//! let mut pm = PixMut::new(64, 100, PixelDepth::Bit32).unwrap();
//! pm.fill(stripcut::color::WHITE);
//! let canvas = assemble(&[PanelFragment::new(1, pm.into())], Background::White).unwrap();
//!
//! let mut sink = MemorySink::new();
//! let n = GutterSegmenter::default()
//!     .segment(&canvas, Background::White, &mut sink)
//!     .unwrap();
//! assert_eq!(n, 0);
//! ```

pub mod chapter;
pub mod config;
mod error;
pub mod manifest;
pub mod naming;

pub use chapter::{
    ChapterImageSet, ChapterOptions, ChapterRun, RunSummary, SkippedChapter, load_fragments,
    load_staged_fragments, write_chapter,
};
pub use config::Config;
pub use error::{ChapterError, ChapterResult, ConfigError};
pub use manifest::{ChapterEntry, Manifest};

// Re-export core types
pub use stripcut_core::*;

// Re-export the member crates as modules
pub use stripcut_fetch as fetch;
pub use stripcut_io as io;
pub use stripcut_segment as segment;
