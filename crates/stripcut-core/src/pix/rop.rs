//! Raster operations (ROP)
//!
//! Source-copy rasterops used to build canvases:
//!
//! - Fill the whole image or a band with one value
//! - Paste (copy) a source image into the destination at an offset

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};

impl PixMut {
    /// Set every pixel to `val`.
    ///
    /// For 32 bpp images `val` is a packed RGBA pixel; for 8 bpp it is a
    /// gray level and for 1 bpp it is 0 or 1.
    pub fn fill(&mut self, val: u32) {
        let word = match self.depth() {
            PixelDepth::Bit1 => {
                if val & 1 != 0 {
                    u32::MAX
                } else {
                    0
                }
            }
            PixelDepth::Bit8 => (val & 0xff) * 0x0101_0101,
            PixelDepth::Bit32 => val,
        };
        self.data_mut().iter_mut().for_each(|w| *w = word);
    }

    /// Copy `src` into this image with its top-left corner at `(dx, dy)`.
    ///
    /// Both images must have the same depth. Parts of the source falling
    /// outside the destination are clipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleDepths`] if the depths differ, and
    /// [`Error::InvalidParameter`] if the offset lies entirely outside the
    /// destination.
    pub fn paste(&mut self, src: &Pix, dx: u32, dy: u32) -> Result<()> {
        if src.depth() != self.depth() {
            return Err(Error::IncompatibleDepths(
                src.depth().bits(),
                self.depth().bits(),
            ));
        }
        if dx >= self.width() || dy >= self.height() {
            return Err(Error::InvalidParameter(format!(
                "paste offset ({}, {}) is outside destination ({}x{})",
                dx,
                dy,
                self.width(),
                self.height()
            )));
        }

        let w = src.width().min(self.width() - dx);
        let h = src.height().min(self.height() - dy);

        if self.depth() == PixelDepth::Bit32 {
            for y in 0..h {
                let src_row = &src.row_data(y)[..w as usize];
                let dst_row = self.row_data_mut(dy + y);
                dst_row[dx as usize..(dx + w) as usize].copy_from_slice(src_row);
            }
        } else {
            for y in 0..h {
                for x in 0..w {
                    let val = src.get_pixel_unchecked(x, y);
                    self.set_pixel_unchecked(dx + x, dy + y, val);
                }
            }
        }
        Ok(())
    }
}
