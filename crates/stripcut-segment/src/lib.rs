//! stripcut-segment - Long-strip canvas assembly and gutter segmentation
//!
//! This crate turns the panel fragments of one chapter into page-sized
//! segments:
//!
//! - **Assembly**: stack fragments into one tall canvas ([`assemble`])
//! - **Classification**: background / content tests on rows and segments
//!   ([`classify`])
//! - **Segmentation**: cut the canvas at gutters, re-searching oversized
//!   spans with the opposite background ([`gutter`])
//! - **Sinks**: where kept segments go ([`sink`])
//!
//! # Quick Start
//!
//! ```no_run
//! use stripcut_segment::{Background, GutterSegmenter, MemorySink, PanelFragment, assemble};
//! use stripcut_core::{Pix, PixelDepth};
//!
//! let fragments = vec![PanelFragment::new(1, Pix::new(800, 3000, PixelDepth::Bit32).unwrap())];
//! let canvas = assemble(&fragments, Background::White).unwrap();
//!
//! let mut sink = MemorySink::new();
//! let count = GutterSegmenter::default()
//!     .segment(&canvas, Background::White, &mut sink)
//!     .unwrap();
//! println!("{} segments", count);
//! ```

pub mod assemble;
pub mod classify;
mod error;
pub mod gutter;
pub mod sink;

pub use error::{AssemblyError, SegmentError, SegmentResult};

pub use assemble::{PanelFragment, assemble};
pub use classify::{Background, ClassifyOptions, ParseBackgroundError, RowPolicy};
pub use gutter::{
    ContentRegion, CutSpan, GutterSegmenter, MAX_OUTPUT_HEIGHT, OversizePolicy, SegmentOptions,
};
pub use sink::{DirSink, MemorySink, SegmentSink};

// Re-export core for convenience
pub use stripcut_core;
