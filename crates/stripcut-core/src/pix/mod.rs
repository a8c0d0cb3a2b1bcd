//! Image container
//!
//! Panel fragments, assembled canvases, binarized masks and written
//! segments are all [`Pix`] values.
//!
//! Rows are padded to whole 32-bit words and pixels are packed from the
//! most significant bit down. A 32 bpp word holds `0xRRGGBBAA`.
//!
//! A `Pix` is an immutable, `Arc`-shared handle. Edits go through a
//! [`PixMut`], obtained with [`PixMut::new`], [`Pix::try_into_mut`] or
//! [`Pix::to_mut`] and turned back into a `Pix` with `into()`.

mod access;
mod clip;
pub mod convert;
mod rop;
pub mod statistics;

pub use access::*;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Bits per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PixelDepth {
    /// 1-bit binary image
    Bit1 = 1,
    /// 8-bit grayscale
    Bit8 = 8,
    /// 32-bit RGB or RGBA
    Bit32 = 32,
}

impl PixelDepth {
    /// Bit count as a number.
    pub fn bits(self) -> u32 {
        self as u32
    }
}

/// Encoded image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Not read from a file, or not recognized
    #[default]
    Unknown,
    Jpeg,
    Png,
}

impl ImageFormat {
    /// File extension used for written images.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Unknown => "dat",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

#[derive(Debug, Clone)]
struct PixData {
    width: u32,
    height: u32,
    depth: PixelDepth,
    /// 1 for gray and binary, 3 for RGB, 4 when alpha is meaningful
    spp: u32,
    /// Words per row
    wpl: u32,
    informat: ImageFormat,
    data: Vec<u32>,
}

impl PixData {
    fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let wpl = compute_wpl(width, depth)?;
        let data_size = (wpl as usize)
            .checked_mul(height as usize)
            .ok_or(Error::InvalidDimension { width, height })?;

        let spp = if depth == PixelDepth::Bit32 { 3 } else { 1 };

        Ok(PixData {
            width,
            height,
            depth,
            spp,
            wpl,
            informat: ImageFormat::Unknown,
            data: vec![0u32; data_size],
        })
    }

    #[inline]
    fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.wpl as usize;
        &self.data[start..start + self.wpl as usize]
    }

    #[inline]
    fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let start = y as usize * self.wpl as usize;
        let wpl = self.wpl as usize;
        &mut self.data[start..start + wpl]
    }
}

/// Words needed for one row of `width` pixels.
fn compute_wpl(width: u32, depth: PixelDepth) -> Result<u32> {
    let bits_per_line = u64::from(width) * u64::from(depth.bits());
    let wpl = bits_per_line.div_ceil(32);
    u32::try_from(wpl).map_err(|_| Error::InvalidDimension { width, height: 1 })
}

/// Shared, read-only image
///
/// Cloning a `Pix` copies a pointer, not the pixels.
///
/// ```
/// use stripcut_core::{Pix, PixelDepth};
///
/// let canvas = Pix::new(800, 12000, PixelDepth::Bit32).unwrap();
/// assert_eq!(canvas.spp(), 3);
/// assert_eq!(canvas.row_data(0).len(), 800);
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Zero-filled image; 32 bpp images start as RGB.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either side is 0.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        Ok(Pix {
            inner: Arc::new(PixData::new(width, height, depth)?),
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Samples per pixel.
    #[inline]
    pub fn spp(&self) -> u32 {
        self.inner.spp
    }

    /// Words per row, padding included.
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    /// Format the image was decoded from.
    #[inline]
    pub fn informat(&self) -> ImageFormat {
        self.inner.informat
    }

    /// All words, row after row.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Number of handles sharing these pixels.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Words of row `y`. At 32 bpp this is exactly `width` pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        assert!(y < self.inner.height, "row {} out of range", y);
        self.inner.row(y)
    }

    /// Whether both images have the same width, height and depth.
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.depth() == other.depth()
    }

    /// Check whether two images hold identical pixels.
    ///
    /// Compares dimensions, depth and every pixel value. Padding bits at
    /// the end of a row are ignored.
    pub fn pixels_equal(&self, other: &Pix) -> bool {
        if !self.sizes_equal(other) {
            return false;
        }
        (0..self.height()).all(|y| {
            (0..self.width()).all(|x| {
                self.get_pixel_unchecked(x, y) == other.get_pixel_unchecked(x, y)
            })
        })
    }

    /// Copy of the pixels that shares nothing with `self`.
    pub fn deep_clone(&self) -> Self {
        Pix {
            inner: Arc::new((*self.inner).clone()),
        }
    }

    /// Take the pixels for editing without copying.
    ///
    /// Fails, handing `self` back, while other handles exist.
    pub fn try_into_mut(self) -> std::result::Result<PixMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(PixMut { inner: data }),
            Err(arc) => Err(Pix { inner: arc }),
        }
    }

    /// Editable copy of the pixels.
    pub fn to_mut(&self) -> PixMut {
        PixMut {
            inner: (*self.inner).clone(),
        }
    }
}

/// Exclusively owned, editable image
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    /// Zero-filled image, see [`Pix::new`].
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        Ok(PixMut {
            inner: PixData::new(width, height, depth)?,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    #[inline]
    pub fn spp(&self) -> u32 {
        self.inner.spp
    }

    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    #[inline]
    pub fn informat(&self) -> ImageFormat {
        self.inner.informat
    }

    /// Record the format the pixels were decoded from.
    pub fn set_informat(&mut self, format: ImageFormat) {
        self.inner.informat = format;
    }

    /// Set samples per pixel; 4 marks the alpha byte as meaningful.
    pub fn set_spp(&mut self, spp: u32) {
        self.inner.spp = spp;
    }

    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// All words, row after row, for editing.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.inner.data
    }

    /// Words of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        assert!(y < self.inner.height, "row {} out of range", y);
        self.inner.row(y)
    }

    /// Words of row `y`, for editing.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u32] {
        assert!(y < self.inner.height, "row {} out of range", y);
        self.inner.row_mut(y)
    }
}

impl From<PixMut> for Pix {
    fn from(pix_mut: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix_mut.inner),
        }
    }
}
