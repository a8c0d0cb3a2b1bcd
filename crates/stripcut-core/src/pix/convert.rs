//! Pixel depth conversion functions
//!
//! Functions for converting between the supported pixel depths, and for
//! normalizing decoded images to opaque 3-channel RGB.

use super::{Pix, PixMut, PixelDepth};
use crate::color;
use crate::error::Result;

impl Pix {
    /// Convert any-depth image to 8-bit grayscale.
    ///
    /// It always creates a new image (never a clone).
    ///
    /// Conversion rules:
    /// - **1 bpp**: 0 -> 255 (white), 1 -> 0 (black)
    /// - **8 bpp**: copy (lossless)
    /// - **32 bpp**: ITU-R 601-2 luma (see [`color::luma`]); alpha is ignored
    ///
    /// # Examples
    ///
    /// ```
    /// use stripcut_core::{Pix, PixelDepth};
    ///
    /// let pix32 = Pix::new(10, 10, PixelDepth::Bit32).unwrap();
    /// let pix8 = pix32.convert_to_8().unwrap();
    /// assert_eq!(pix8.depth(), PixelDepth::Bit8);
    /// ```
    pub fn convert_to_8(&self) -> Result<Pix> {
        let w = self.width();
        let h = self.height();

        match self.depth() {
            PixelDepth::Bit8 => Ok(self.deep_clone()),
            PixelDepth::Bit1 => {
                let mut result = PixMut::new(w, h, PixelDepth::Bit8)?;
                for y in 0..h {
                    for x in 0..w {
                        let val = self.get_pixel_unchecked(x, y);
                        let gray = if val == 0 { 255u32 } else { 0u32 };
                        result.set_pixel_unchecked(x, y, gray);
                    }
                }
                Ok(result.into())
            }
            PixelDepth::Bit32 => {
                let mut result = PixMut::new(w, h, PixelDepth::Bit8)?;
                for y in 0..h {
                    let src = self.row_data(y);
                    for (x, &pixel) in src.iter().enumerate() {
                        result.set_pixel_unchecked(x as u32, y, color::luma_of(pixel) as u32);
                    }
                }
                Ok(result.into())
            }
        }
    }

    /// Convert any-depth image to 32-bit RGB.
    ///
    /// - **1 bpp**: 0 -> white, 1 -> black
    /// - **8 bpp**: gray replicated into R, G and B
    /// - **32 bpp**: deep copy (alpha and spp preserved)
    pub fn convert_to_32(&self) -> Result<Pix> {
        let w = self.width();
        let h = self.height();

        match self.depth() {
            PixelDepth::Bit32 => Ok(self.deep_clone()),
            PixelDepth::Bit1 | PixelDepth::Bit8 => {
                let gray = if self.depth() == PixelDepth::Bit1 {
                    self.convert_to_8()?
                } else {
                    self.clone()
                };
                let mut result = PixMut::new(w, h, PixelDepth::Bit32)?;
                for y in 0..h {
                    for x in 0..w {
                        let g = gray.get_pixel_unchecked(x, y) as u8;
                        result.set_pixel_unchecked(x, y, color::compose_rgb(g, g, g));
                    }
                }
                Ok(result.into())
            }
        }
    }

    /// Normalize to opaque 3-channel RGB.
    ///
    /// Grayscale and binary images are expanded as in
    /// [`convert_to_32`](Self::convert_to_32). 32 bpp images with an alpha
    /// channel (`spp == 4`) are composited over `matte`, a packed RGB
    /// pixel, so transparent areas take the matte color. The result always
    /// has `spp == 3` and every alpha byte set to 255.
    pub fn to_rgb(&self, matte: u32) -> Result<Pix> {
        let rgb = self.convert_to_32()?;
        let mut out = match rgb.try_into_mut() {
            Ok(pm) => pm,
            Err(shared) => shared.to_mut(),
        };
        let has_alpha = out.spp() == 4;
        for word in out.data_mut() {
            *word = if has_alpha {
                color::flatten_over(*word, matte)
            } else {
                *word | 0xff
            };
        }
        out.set_spp(3);
        Ok(out.into())
    }
}
