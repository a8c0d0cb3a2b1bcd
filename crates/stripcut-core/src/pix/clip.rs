//! Sub-image extraction
//!
//! Segments are full-width bands, taken with [`Pix::clip_rows`] as whole
//! row copies. [`Pix::clip_rectangle`] handles arbitrary rectangles.

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};

impl Pix {
    /// Copy the rectangle at `(x, y)` of size `w` x `h`.
    ///
    /// The rectangle is cut back to the image edge; 32 bpp output keeps
    /// the source `spp`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `w` or `h` is 0 or the origin lies
    /// outside the image.
    ///
    /// ```
    /// use stripcut_core::{Pix, PixelDepth};
    ///
    /// let pix = Pix::new(100, 80, PixelDepth::Bit8).unwrap();
    /// let corner = pix.clip_rectangle(80, 60, 50, 50).unwrap();
    /// assert_eq!((corner.width(), corner.height()), (20, 20));
    /// ```
    pub fn clip_rectangle(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Pix> {
        if w == 0 || h == 0 {
            return Err(Error::InvalidParameter(format!(
                "empty clip {}x{}",
                w, h
            )));
        }

        let src_w = self.width();
        let src_h = self.height();

        if x >= src_w || y >= src_h {
            return Err(Error::InvalidParameter(format!(
                "clip origin ({}, {}) outside {}x{} image",
                x, y, src_w, src_h
            )));
        }

        let clip_w = w.min(src_w - x);
        let clip_h = h.min(src_h - y);

        if x == 0 && clip_w == src_w {
            return self.clip_rows(y, clip_h);
        }

        let depth = self.depth();
        let mut pixd = PixMut::new(clip_w, clip_h, depth)?;
        if depth == PixelDepth::Bit32 {
            pixd.set_spp(self.spp());
        }

        for dy in 0..clip_h {
            for dx in 0..clip_w {
                let val = self.get_pixel_unchecked(x + dx, y + dy);
                pixd.set_pixel_unchecked(dx, dy, val);
            }
        }

        Ok(pixd.into())
    }

    /// Extract the full-width band of rows `[y, y + h)`.
    ///
    /// Rows past the bottom of the image are clipped away.
    ///
    /// # Errors
    ///
    /// Returns an error if `h` is 0 or `y` is at or past the last row.
    pub fn clip_rows(&self, y: u32, h: u32) -> Result<Pix> {
        if h == 0 {
            return Err(Error::InvalidParameter(
                "row band has zero height".to_string(),
            ));
        }
        if y >= self.height() {
            return Err(Error::InvalidParameter(format!(
                "row band start {} is outside image height {}",
                y,
                self.height()
            )));
        }

        let clip_h = h.min(self.height() - y);
        if y == 0 && clip_h == self.height() {
            return Ok(self.clone());
        }

        let mut pixd = PixMut::new(self.width(), clip_h, self.depth())?;
        pixd.set_spp(self.spp());
        pixd.set_informat(self.informat());

        let wpl = self.wpl() as usize;
        let start = y as usize * wpl;
        let end = start + clip_h as usize * wpl;
        pixd.data_mut().copy_from_slice(&self.data()[start..end]);

        Ok(pixd.into())
    }
}
