//! Pixel access functions
//!
//! Low-level functions for getting and setting individual pixels.
//!
//! # Pixel packing
//!
//! Pixels are packed MSB-to-LSB within each 32-bit word. For example,
//! in a 1-bit image, pixel 0 occupies bit 31 (MSB) of the first word,
//! and in an 8-bit image pixel 0 occupies bits 24..32.

use super::{Pix, PixMut, PixelDepth};
use crate::color;
use crate::error::{Error, Result};

#[inline]
fn read_word_pixel(line: &[u32], depth: PixelDepth, x: u32) -> u32 {
    match depth {
        PixelDepth::Bit1 => get_data_bit(line, x),
        PixelDepth::Bit8 => get_data_byte(line, x),
        PixelDepth::Bit32 => get_data_four_bytes(line, x),
    }
}

#[inline]
fn write_word_pixel(line: &mut [u32], depth: PixelDepth, x: u32, val: u32) {
    match depth {
        PixelDepth::Bit1 => set_data_bit(line, x, val),
        PixelDepth::Bit8 => set_data_byte(line, x, val),
        PixelDepth::Bit32 => set_data_four_bytes(line, x, val),
    }
}

impl Pix {
    /// Get a pixel value at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        read_word_pixel(self.inner.row(y), self.depth(), x)
    }

    /// Get RGB values at (x, y).
    ///
    /// Only valid for 32-bit images.
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if self.depth() != PixelDepth::Bit32 {
            return None;
        }
        self.get_pixel(x, y).map(color::extract_rgb)
    }
}

impl PixMut {
    /// Get a pixel value at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    /// Get a pixel value without bounds checking.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        read_word_pixel(self.inner.row(y), self.depth(), x)
    }

    /// Set a pixel value at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        if x >= self.width() {
            return Err(Error::IndexOutOfBounds {
                index: x as usize,
                len: self.width() as usize,
            });
        }
        if y >= self.height() {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height() as usize,
            });
        }
        self.set_pixel_unchecked(x, y, val);
        Ok(())
    }

    /// Set a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, val: u32) {
        let depth = self.depth();
        write_word_pixel(self.inner.row_mut(y), depth, x, val);
    }

    /// Set an RGB pixel at (x, y).
    ///
    /// Only valid for 32-bit images.
    pub fn set_rgb(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> Result<()> {
        if self.depth() != PixelDepth::Bit32 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        self.set_pixel(x, y, color::compose_rgb(r, g, b))
    }
}

/// Get a 1-bit pixel value.
///
/// Pixels are packed MSB to LSB within each 32-bit word.
#[inline]
pub fn get_data_bit(line: &[u32], x: u32) -> u32 {
    (line[(x >> 5) as usize] >> (31 - (x & 31))) & 1
}

/// Set a 1-bit pixel value.
#[inline]
pub fn set_data_bit(line: &mut [u32], x: u32, val: u32) {
    let word = &mut line[(x >> 5) as usize];
    let mask = 1u32 << (31 - (x & 31));
    if val & 1 != 0 {
        *word |= mask;
    } else {
        *word &= !mask;
    }
}

/// Get an 8-bit pixel value.
#[inline]
pub fn get_data_byte(line: &[u32], x: u32) -> u32 {
    let shift = 8 * (3 - (x & 3));
    (line[(x >> 2) as usize] >> shift) & 0xff
}

/// Set an 8-bit pixel value.
#[inline]
pub fn set_data_byte(line: &mut [u32], x: u32, val: u32) {
    let shift = 8 * (3 - (x & 3));
    let word = &mut line[(x >> 2) as usize];
    *word = (*word & !(0xff << shift)) | ((val & 0xff) << shift);
}

/// Get a 32-bit pixel value.
#[inline]
pub fn get_data_four_bytes(line: &[u32], x: u32) -> u32 {
    line[x as usize]
}

/// Set a 32-bit pixel value.
#[inline]
pub fn set_data_four_bytes(line: &mut [u32], x: u32, val: u32) {
    line[x as usize] = val;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_packing_is_msb_first() {
        let mut line = [0u32; 2];
        set_data_bit(&mut line, 0, 1);
        assert_eq!(line[0], 0x8000_0000);
        set_data_bit(&mut line, 33, 1);
        assert_eq!(line[1], 0x4000_0000);
        assert_eq!(get_data_bit(&line, 33), 1);
        set_data_bit(&mut line, 0, 0);
        assert_eq!(line[0], 0);
    }

    #[test]
    fn test_byte_packing_is_msb_first() {
        let mut line = [0u32; 1];
        set_data_byte(&mut line, 0, 0xab);
        set_data_byte(&mut line, 3, 0x12);
        assert_eq!(line[0], 0xab00_0012);
        assert_eq!(get_data_byte(&line, 0), 0xab);
        assert_eq!(get_data_byte(&line, 1), 0);
        // Values are masked to 8 bits
        set_data_byte(&mut line, 1, 0x1ff);
        assert_eq!(get_data_byte(&line, 1), 0xff);
    }

    #[test]
    fn test_get_set_pixel_all_depths() {
        for (depth, val) in [
            (PixelDepth::Bit1, 1),
            (PixelDepth::Bit8, 200),
            (PixelDepth::Bit32, 0x1234_56ff),
        ] {
            let mut pm = PixMut::new(40, 3, depth).unwrap();
            pm.set_pixel(37, 2, val).unwrap();
            let pix: Pix = pm.into();
            assert_eq!(pix.get_pixel(37, 2), Some(val));
            assert_eq!(pix.get_pixel(36, 2), Some(0));
            assert_eq!(pix.get_pixel(40, 0), None);
        }
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let mut pm = PixMut::new(5, 5, PixelDepth::Bit8).unwrap();
        assert!(pm.set_pixel(5, 0, 1).is_err());
        assert!(pm.set_pixel(0, 5, 1).is_err());
    }

    #[test]
    fn test_rgb_access() {
        let mut pm = PixMut::new(2, 2, PixelDepth::Bit32).unwrap();
        pm.set_rgb(1, 1, 10, 20, 30).unwrap();
        let pix: Pix = pm.into();
        assert_eq!(pix.get_rgb(1, 1), Some((10, 20, 30)));

        let mut gray = PixMut::new(2, 2, PixelDepth::Bit8).unwrap();
        assert!(gray.set_rgb(0, 0, 1, 2, 3).is_err());
    }
}
