//! stripcut core - Image container and pixel operations
//!
//! This crate provides the data structures every other stripcut crate
//! builds on:
//!
//! - [`Pix`] / [`PixMut`] - The image container (immutable / mutable)
//! - [`PixelDepth`] - Supported bit depths (1, 8 and 32 bpp)
//! - [`ImageFormat`] - Encoded formats understood by `stripcut-io`
//! - [`color`] - Helpers for packed 32-bit RGBA pixels
//!
//! Long strips are tall RGB rasters, so the operations here are the ones
//! a row-oriented segmenter needs: grayscale conversion, row clipping,
//! pasting one image into another, and per-row / whole-image statistics.

pub mod error;
pub mod pix;

pub use error::{Error, Result};
pub use pix::statistics::GrayStats;
pub use pix::{ImageFormat, Pix, PixMut, PixelDepth};

/// Color channel helpers for 32-bit RGBA pixels.
///
/// # Pixel format
///
/// 32-bit pixels are stored as `0xRRGGBBAA` (red in MSB, alpha in LSB).
pub mod color {
    /// Shift amounts for extracting color channels
    pub const RED_SHIFT: u32 = 24;
    pub const GREEN_SHIFT: u32 = 16;
    pub const BLUE_SHIFT: u32 = 8;
    pub const ALPHA_SHIFT: u32 = 0;

    /// Packed opaque white.
    pub const WHITE: u32 = 0xffff_ffff;
    /// Packed opaque black.
    pub const BLACK: u32 = 0x0000_00ff;

    /// Extract red component from a 32-bit pixel.
    #[inline]
    pub fn red(pixel: u32) -> u8 {
        ((pixel >> RED_SHIFT) & 0xff) as u8
    }

    /// Extract green component from a 32-bit pixel.
    #[inline]
    pub fn green(pixel: u32) -> u8 {
        ((pixel >> GREEN_SHIFT) & 0xff) as u8
    }

    /// Extract blue component from a 32-bit pixel.
    #[inline]
    pub fn blue(pixel: u32) -> u8 {
        ((pixel >> BLUE_SHIFT) & 0xff) as u8
    }

    /// Extract alpha component from a 32-bit pixel.
    #[inline]
    pub fn alpha(pixel: u32) -> u8 {
        ((pixel >> ALPHA_SHIFT) & 0xff) as u8
    }

    /// Compose a 32-bit RGB pixel (alpha = 255).
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        ((r as u32) << RED_SHIFT)
            | ((g as u32) << GREEN_SHIFT)
            | ((b as u32) << BLUE_SHIFT)
            | (255 << ALPHA_SHIFT)
    }

    /// Compose a 32-bit RGBA pixel.
    #[inline]
    pub fn compose_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
        ((r as u32) << RED_SHIFT)
            | ((g as u32) << GREEN_SHIFT)
            | ((b as u32) << BLUE_SHIFT)
            | ((a as u32) << ALPHA_SHIFT)
    }

    /// Extract RGB values from a 32-bit pixel.
    #[inline]
    pub fn extract_rgb(pixel: u32) -> (u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel))
    }

    /// Extract RGBA values from a 32-bit pixel.
    #[inline]
    pub fn extract_rgba(pixel: u32) -> (u8, u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel), alpha(pixel))
    }

    /// Luma of an RGB triple using the ITU-R 601-2 weights
    /// (`L = 0.299 R + 0.587 G + 0.114 B`), truncated.
    #[inline]
    pub fn luma(r: u8, g: u8, b: u8) -> u8 {
        ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
    }

    /// Luma of a packed 32-bit pixel; alpha is ignored.
    #[inline]
    pub fn luma_of(pixel: u32) -> u8 {
        luma(red(pixel), green(pixel), blue(pixel))
    }

    /// Composite an RGBA pixel over an opaque matte color.
    ///
    /// The result is opaque. `matte` is a packed RGB(A) pixel whose alpha
    /// is ignored.
    pub fn flatten_over(pixel: u32, matte: u32) -> u32 {
        let (r, g, b, a) = extract_rgba(pixel);
        if a == 255 {
            return compose_rgb(r, g, b);
        }
        let (mr, mg, mb) = extract_rgb(matte);
        let a = a as u32;
        let mix = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        compose_rgb(mix(r, mr), mix(g, mg), mix(b, mb))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_compose_and_extract() {
            let p = compose_rgb(10, 20, 30);
            assert_eq!(extract_rgba(p), (10, 20, 30, 255));
            assert_eq!(WHITE, compose_rgb(255, 255, 255));
            assert_eq!(BLACK, compose_rgb(0, 0, 0));
        }

        #[test]
        fn test_luma_extremes() {
            assert_eq!(luma(255, 255, 255), 255);
            assert_eq!(luma(0, 0, 0), 0);
            // Pure green weighs most
            assert_eq!(luma(0, 255, 0), 149);
            assert_eq!(luma(255, 0, 0), 76);
            assert_eq!(luma(0, 0, 255), 29);
        }

        #[test]
        fn test_flatten_over() {
            // Fully transparent takes the matte
            assert_eq!(flatten_over(compose_rgba(0, 0, 0, 0), WHITE), WHITE);
            // Fully opaque keeps the color
            assert_eq!(
                flatten_over(compose_rgba(1, 2, 3, 255), WHITE),
                compose_rgb(1, 2, 3)
            );
            // Half alpha lands in the middle
            let p = flatten_over(compose_rgba(0, 0, 0, 128), WHITE);
            assert_eq!(red(p), 127);
        }
    }
}
