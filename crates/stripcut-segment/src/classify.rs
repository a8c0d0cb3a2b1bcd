//! Pixel classification
//!
//! Decides, from pixel statistics alone, whether a row belongs to the
//! background and whether a cropped segment carries enough content to be
//! kept.
//!
//! Every test works on luma (see [`stripcut_core::color::luma`]):
//!
//! - [`binarize`] marks content pixels against a background color
//! - [`is_background_row`] applies one of the [`RowPolicy`] rules to a row
//! - [`has_significant_content`] filters near-blank segments

use crate::SegmentResult;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use stripcut_core::{Pix, PixMut, PixelDepth, color};

/// Assumed background color of a strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Light pages (gray near 255)
    #[default]
    White,
    /// Dark pages (gray near 0)
    Black,
}

impl Background {
    /// The other background.
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Packed opaque RGB pixel of this background.
    pub fn fill_pixel(self) -> u32 {
        match self {
            Self::White => color::WHITE,
            Self::Black => color::BLACK,
        }
    }

    /// Gray level of this background.
    pub fn gray(self) -> u8 {
        match self {
            Self::White => 255,
            Self::Black => 0,
        }
    }

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown background name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBackgroundError(String);

impl fmt::Display for ParseBackgroundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown background '{}' (expected white or black)", self.0)
    }
}

impl std::error::Error for ParseBackgroundError {}

impl FromStr for Background {
    type Err = ParseBackgroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            _ => Err(ParseBackgroundError(s.to_string())),
        }
    }
}

/// Rule used to decide whether a single row is background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// The modal gray level covers at least `dominant_fraction` of the row
    /// and lies on the background's side of 128.
    Dominant,
    /// Every pixel in the row has the same RGB value.
    Uniform,
    /// No pixel in the row passes the content cutoff of [`binarize`].
    Threshold,
}

/// Thresholds for pixel classification
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOptions {
    /// Share of a row the modal gray level must reach under
    /// [`RowPolicy::Dominant`] (default: 0.95)
    pub dominant_fraction: f64,
    /// On a white background, a pixel brighter than this is background
    /// (default: 230)
    pub white_cutoff: u8,
    /// On a black background, a pixel at or below this is background
    /// (default: 15)
    pub black_cutoff: u8,
    /// On a white background, pixels darker than this count as extreme
    /// (default: 50)
    pub dark_cutoff: u8,
    /// On a black background, pixels brighter than this count as extreme
    /// (default: 205)
    pub light_cutoff: u8,
    /// Extreme pixels needed for a segment to be significant (default: 500)
    pub min_extreme_pixels: u64,
    /// Standard deviation above which a segment is significant
    /// (default: 15.0)
    pub min_std_dev: f64,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            dominant_fraction: 0.95,
            white_cutoff: 230,
            black_cutoff: 15,
            dark_cutoff: 50,
            light_cutoff: 205,
            min_extreme_pixels: 500,
            min_std_dev: 15.0,
        }
    }
}

impl ClassifyOptions {
    /// Set the dominant-value share for [`RowPolicy::Dominant`]
    pub fn with_dominant_fraction(mut self, fraction: f64) -> Self {
        self.dominant_fraction = fraction;
        self
    }

    /// Set the binarization cutoffs for white and black backgrounds
    pub fn with_cutoffs(mut self, white: u8, black: u8) -> Self {
        self.white_cutoff = white;
        self.black_cutoff = black;
        self
    }

    /// Set the extreme-pixel cutoffs for white and black backgrounds
    pub fn with_extreme_cutoffs(mut self, dark: u8, light: u8) -> Self {
        self.dark_cutoff = dark;
        self.light_cutoff = light;
        self
    }

    /// Set the significance limits
    pub fn with_significance(mut self, min_extreme_pixels: u64, min_std_dev: f64) -> Self {
        self.min_extreme_pixels = min_extreme_pixels;
        self.min_std_dev = min_std_dev;
        self
    }

    /// Whether a gray level is content against `background`.
    #[inline]
    pub fn is_content(&self, gray: u8, background: Background) -> bool {
        match background {
            Background::White => gray <= self.white_cutoff,
            Background::Black => gray > self.black_cutoff,
        }
    }
}

/// Binarize an image against a background.
///
/// Returns a 1 bpp mask of the same size where content pixels are ON.
/// Accepts 8 and 32 bpp input.
pub fn binarize(pix: &Pix, background: Background, options: &ClassifyOptions) -> SegmentResult<Pix> {
    let gray = match pix.depth() {
        PixelDepth::Bit8 => pix.clone(),
        _ => pix.convert_to_8()?,
    };
    let mut mask = PixMut::new(pix.width(), pix.height(), PixelDepth::Bit1)?;
    for y in 0..gray.height() {
        for x in 0..gray.width() {
            if options.is_content(gray.get_pixel_unchecked(x, y) as u8, background) {
                mask.set_pixel_unchecked(x, y, 1);
            }
        }
    }
    Ok(mask.into())
}

/// Number of content pixels in every row.
pub fn row_scores(pix: &Pix, background: Background, options: &ClassifyOptions) -> SegmentResult<Vec<u32>> {
    Ok(binarize(pix, background, options)?.count_pixels_by_row()?)
}

/// Whether row `y` of a 32 bpp image is background under `policy`.
///
/// # Panics
///
/// Panics if `y >= pix.height()`.
pub fn is_background_row(
    pix: &Pix,
    y: u32,
    background: Background,
    policy: RowPolicy,
    options: &ClassifyOptions,
) -> bool {
    let row = &pix.row_data(y)[..pix.width() as usize];
    match policy {
        RowPolicy::Uniform => {
            let first = row[0] >> 8;
            row.iter().all(|&p| p >> 8 == first)
        }
        RowPolicy::Threshold => row
            .iter()
            .all(|&p| !options.is_content(color::luma_of(p), background)),
        RowPolicy::Dominant => {
            let mut hist = [0u32; 256];
            for &p in row {
                hist[color::luma_of(p) as usize] += 1;
            }
            let (value, count) = hist
                .iter()
                .enumerate()
                .fold((0usize, 0u32), |best, (v, &n)| if n > best.1 { (v, n) } else { best });
            let share = f64::from(count) / row.len() as f64;
            let on_background_side = match background {
                Background::White => value >= 128,
                Background::Black => value < 128,
            };
            share >= options.dominant_fraction && on_background_side
        }
    }
}

/// Whether a segment holds enough content to be kept.
///
/// Counts pixels at the extreme opposite the background and measures the
/// spread of gray levels. Either a large enough count or a wide enough
/// spread makes the segment significant.
pub fn has_significant_content(
    pix: &Pix,
    background: Background,
    options: &ClassifyOptions,
) -> SegmentResult<bool> {
    let stats = pix.gray_stats()?;
    let extreme = match background {
        Background::White => stats.count_below(options.dark_cutoff),
        Background::Black => stats.count_above(options.light_cutoff),
    };
    Ok(extreme >= options.min_extreme_pixels || stats.std_dev() > options.min_std_dev)
}
