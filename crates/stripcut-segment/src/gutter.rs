//! Gutter segmentation
//!
//! Cuts a tall canvas into segments at horizontal gutters, the
//! background-colored bands between panels.
//!
//! # Algorithm
//!
//! 1. Every row gets a content score under the configured [`RowPolicy`].
//!    With [`RowPolicy::Threshold`] the score is the number of content
//!    pixels from [`binarize`](crate::classify::binarize).
//! 2. Rows are walked top to bottom. A content region opens at the first
//!    scored row and closes once more than `min_run_height` zero rows
//!    follow it; shorter gaps are absorbed. Only regions taller than
//!    `min_run_height` are kept, and a region still open at the bottom
//!    is left to the trailing span.
//! 3. Each kept region ends a candidate `[previous_cut, region.end_y)`,
//!    so cuts fall at the top of a gutter. The remainder
//!    `[previous_cut, height)` is the last candidate.
//! 4. Candidates failing [`has_significant_content`] are discarded,
//!    whatever their height. Candidates within `max_segment_height` are
//!    written. Taller ones are searched again with the opposite
//!    background, up to `max_recursion_depth`; what is still too tall
//!    after that is handled by [`OversizePolicy`].
//!
//! A span found in a flipped pass must be significant against both
//! backgrounds, so neither blank paper nor a solid divider is written.
//! No segment is taller than `max_output_height`.
//!
//! Output indices are 1-based and contiguous across recursion.
//! Discarded candidates do not consume an index.

use crate::classify::{
    Background, ClassifyOptions, RowPolicy, has_significant_content, is_background_row, row_scores,
};
use crate::sink::SegmentSink;
use crate::{SegmentError, SegmentResult};
use serde::Deserialize;
use stripcut_core::{Pix, PixelDepth};
use tracing::{debug, info};

/// Largest side a JPEG encoder accepts
pub const MAX_OUTPUT_HEIGHT: u32 = u16::MAX as u32;

/// What to do with a candidate that is still too tall once recursion is
/// exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Write it as one tall segment
    #[default]
    Keep,
    /// Slice it into consecutive chunks of at most `max_segment_height`
    #[serde(alias = "split")]
    HardSplit,
}

/// Options for gutter segmentation
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOptions {
    /// Gutters and regions must be taller than this (default: 30)
    pub min_run_height: u32,
    /// Preferred maximum segment height (default: 2500)
    pub max_segment_height: u32,
    /// Row classification rule (default: `Threshold`)
    pub row_policy: RowPolicy,
    /// Pixel thresholds, including the binarization cutoffs
    pub classify: ClassifyOptions,
    /// How many times an oversized candidate is searched again with the
    /// opposite background (default: 1)
    pub max_recursion_depth: u32,
    /// Handling of candidates still too tall after recursion
    pub oversize: OversizePolicy,
    /// Hard cap on written segment height, applied under every policy
    /// (default: [`MAX_OUTPUT_HEIGHT`])
    pub max_output_height: u32,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            min_run_height: 30,
            max_segment_height: 2500,
            row_policy: RowPolicy::Threshold,
            classify: ClassifyOptions::default(),
            max_recursion_depth: 1,
            oversize: OversizePolicy::Keep,
            max_output_height: MAX_OUTPUT_HEIGHT,
        }
    }
}

impl SegmentOptions {
    /// Set the minimum gutter / region height
    pub fn with_min_run_height(mut self, rows: u32) -> Self {
        self.min_run_height = rows;
        self
    }

    /// Set the maximum segment height
    pub fn with_max_segment_height(mut self, rows: u32) -> Self {
        self.max_segment_height = rows;
        self
    }

    /// Set the row classification rule
    pub fn with_row_policy(mut self, policy: RowPolicy) -> Self {
        self.row_policy = policy;
        self
    }

    /// Set the pixel thresholds
    pub fn with_classify(mut self, classify: ClassifyOptions) -> Self {
        self.classify = classify;
        self
    }

    /// Set the binarization cutoffs for white and black backgrounds
    pub fn with_cutoffs(mut self, white: u8, black: u8) -> Self {
        self.classify = self.classify.with_cutoffs(white, black);
        self
    }

    /// Set the recursion limit
    pub fn with_max_recursion_depth(mut self, depth: u32) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Set the oversize policy
    pub fn with_oversize(mut self, oversize: OversizePolicy) -> Self {
        self.oversize = oversize;
        self
    }

    /// Set the hard cap on written segment height
    pub fn with_max_output_height(mut self, rows: u32) -> Self {
        self.max_output_height = rows;
        self
    }

    fn validate(&self) -> SegmentResult<()> {
        if self.min_run_height == 0 {
            return Err(SegmentError::InvalidParameters(
                "min_run_height must be positive".to_string(),
            ));
        }
        if self.max_segment_height == 0 {
            return Err(SegmentError::InvalidParameters(
                "max_segment_height must be positive".to_string(),
            ));
        }
        if self.max_output_height == 0 {
            return Err(SegmentError::InvalidParameters(
                "max_output_height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Half-open range of content rows `[start_y, end_y)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRegion {
    pub start_y: u32,
    pub end_y: u32,
}

impl ContentRegion {
    /// Region height in rows.
    pub fn height(&self) -> u32 {
        self.end_y.saturating_sub(self.start_y)
    }
}

/// One written segment, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutSpan {
    /// 1-based output index
    pub index: u32,
    /// First row (inclusive)
    pub start_y: u32,
    /// Last row (exclusive)
    pub end_y: u32,
    /// Background assumed when the span was found
    pub background: Background,
    /// Recursion level that produced the span (0 for the top level)
    pub depth: u32,
}

impl CutSpan {
    /// Span height in rows.
    pub fn height(&self) -> u32 {
        self.end_y.saturating_sub(self.start_y)
    }
}

/// Scan a row profile for content regions.
///
/// `scores[y] > 0` marks row `y` as content. See the module docs for the
/// debounce rule.
pub fn scan_regions(scores: &[u32], min_run_height: u32) -> Vec<ContentRegion> {
    let mut regions = Vec::new();
    let mut open: Option<u32> = None;
    let mut content_end = 0u32;

    for (y, &score) in scores.iter().enumerate() {
        let y = y as u32;
        if score > 0 {
            if open.is_none() {
                open = Some(y);
            }
            content_end = y + 1;
        } else if let Some(start_y) = open
            && y + 1 - content_end > min_run_height
        {
            if content_end - start_y > min_run_height {
                regions.push(ContentRegion {
                    start_y,
                    end_y: content_end,
                });
            }
            open = None;
        }
    }
    regions
}

/// Segments a canvas at its gutters
#[derive(Debug, Clone, Default)]
pub struct GutterSegmenter {
    options: SegmentOptions,
}

struct Walk<F> {
    next_index: u32,
    emit: F,
}

impl GutterSegmenter {
    /// Create a segmenter with the given options.
    pub fn new(options: SegmentOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Per-row content profile of `pix` against `background`.
    pub fn row_profile(&self, pix: &Pix, background: Background) -> SegmentResult<Vec<u32>> {
        let opts = &self.options.classify;
        match self.options.row_policy {
            RowPolicy::Threshold => row_scores(pix, background, opts),
            policy => {
                let pix = rgb_view(pix)?;
                Ok((0..pix.height())
                    .map(|y| u32::from(!is_background_row(&pix, y, background, policy, opts)))
                    .collect())
            }
        }
    }

    /// Content regions of `canvas`, without recursion or filtering.
    pub fn find_regions(&self, canvas: &Pix, background: Background) -> SegmentResult<Vec<ContentRegion>> {
        self.options.validate()?;
        let scores = self.row_profile(canvas, background)?;
        Ok(scan_regions(&scores, self.options.min_run_height))
    }

    /// Spans that [`segment`](Self::segment) would write.
    pub fn plan(&self, canvas: &Pix, background: Background) -> SegmentResult<Vec<CutSpan>> {
        let mut spans = Vec::new();
        self.run(canvas, background, |span, _| {
            spans.push(*span);
            Ok(())
        })?;
        Ok(spans)
    }

    /// Segment `canvas` and hand every kept segment to `sink`.
    ///
    /// Returns the number of segments written.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::InvalidParameters`] if `min_run_height` or
    /// `max_segment_height` or `max_output_height` is zero, and
    /// propagates sink errors.
    pub fn segment<S: SegmentSink + ?Sized>(
        &self,
        canvas: &Pix,
        background: Background,
        sink: &mut S,
    ) -> SegmentResult<u32> {
        let spans = self.run(canvas, background, |span, pix| {
            sink.write_segment(span.index, pix)
        })?;
        info!(
            segments = spans,
            width = canvas.width(),
            height = canvas.height(),
            %background,
            "segmented canvas"
        );
        Ok(spans)
    }

    fn run<F>(&self, canvas: &Pix, background: Background, emit: F) -> SegmentResult<u32>
    where
        F: FnMut(&CutSpan, &Pix) -> SegmentResult<()>,
    {
        self.options.validate()?;
        let canvas = rgb_view(canvas)?;
        let mut walk = Walk {
            next_index: 1,
            emit,
        };
        self.walk(&mut walk, &canvas, 0, background, 0)?;
        Ok(walk.next_index - 1)
    }

    /// Segment `pix`, whose top row sits at `offset` in the canvas.
    fn walk<F>(
        &self,
        walk: &mut Walk<F>,
        pix: &Pix,
        offset: u32,
        background: Background,
        depth: u32,
    ) -> SegmentResult<()>
    where
        F: FnMut(&CutSpan, &Pix) -> SegmentResult<()>,
    {
        let scores = self.row_profile(pix, background)?;
        let regions = scan_regions(&scores, self.options.min_run_height);
        debug!(depth, offset, %background, regions = regions.len(), "found content regions");

        let mut prev_cut = 0;
        for region in &regions {
            self.candidate(walk, pix, offset, prev_cut, region.end_y, background, depth)?;
            prev_cut = region.end_y;
        }
        self.candidate(walk, pix, offset, prev_cut, pix.height(), background, depth)
    }

    #[allow(clippy::too_many_arguments)]
    fn candidate<F>(
        &self,
        walk: &mut Walk<F>,
        pix: &Pix,
        offset: u32,
        start_y: u32,
        end_y: u32,
        background: Background,
        depth: u32,
    ) -> SegmentResult<()>
    where
        F: FnMut(&CutSpan, &Pix) -> SegmentResult<()>,
    {
        if end_y <= start_y {
            return Ok(());
        }
        let height = end_y - start_y;
        let band = pix.clip_rows(start_y, height)?;
        let start_y = offset + start_y;

        if !self.is_significant(&band, background, depth)? {
            debug!(start_y, height, %background, "discarded blank candidate");
            return Ok(());
        }

        let max = self.options.max_segment_height;
        if height <= max {
            return self.slice(walk, &band, start_y, background, depth, self.options.max_output_height);
        }

        if depth < self.options.max_recursion_depth {
            debug!(
                start_y,
                height,
                "oversized candidate, retrying with {}",
                background.opposite()
            );
            return self.walk(walk, &band, start_y, background.opposite(), depth + 1);
        }

        let chunk = match self.options.oversize {
            OversizePolicy::Keep => self.options.max_output_height,
            OversizePolicy::HardSplit => max.min(self.options.max_output_height),
        };
        self.slice(walk, &band, start_y, background, depth, chunk)
    }

    /// Significance of a span found under `background` at `depth`.
    fn is_significant(&self, pix: &Pix, background: Background, depth: u32) -> SegmentResult<bool> {
        let opts = &self.options.classify;
        if !has_significant_content(pix, background, opts)? {
            return Ok(false);
        }
        Ok(depth == 0 || has_significant_content(pix, background.opposite(), opts)?)
    }

    /// Write `band` in consecutive chunks of at most `chunk` rows. Chunks
    /// of a split band are filtered on their own.
    fn slice<F>(
        &self,
        walk: &mut Walk<F>,
        band: &Pix,
        start_y: u32,
        background: Background,
        depth: u32,
        chunk: u32,
    ) -> SegmentResult<()>
    where
        F: FnMut(&CutSpan, &Pix) -> SegmentResult<()>,
    {
        let height = band.height();
        if height <= chunk {
            return self.emit(walk, band, start_y, background, depth);
        }
        let mut y = 0;
        while y < height {
            let piece = band.clip_rows(y, chunk.min(height - y))?;
            if self.is_significant(&piece, background, depth)? {
                self.emit(walk, &piece, start_y + y, background, depth)?;
            } else {
                debug!(start_y = start_y + y, height = piece.height(), "discarded blank chunk");
            }
            y += piece.height();
        }
        Ok(())
    }

    fn emit<F>(
        &self,
        walk: &mut Walk<F>,
        segment: &Pix,
        start_y: u32,
        background: Background,
        depth: u32,
    ) -> SegmentResult<()>
    where
        F: FnMut(&CutSpan, &Pix) -> SegmentResult<()>,
    {
        let span = CutSpan {
            index: walk.next_index,
            start_y,
            end_y: start_y + segment.height(),
            background,
            depth,
        };
        (walk.emit)(&span, segment)?;
        walk.next_index += 1;
        Ok(())
    }
}

/// The canvas as 32 bpp RGB, converting only when needed.
fn rgb_view(pix: &Pix) -> SegmentResult<Pix> {
    if pix.depth() == PixelDepth::Bit32 {
        Ok(pix.clone())
    } else {
        Ok(pix.convert_to_32()?)
    }
}
