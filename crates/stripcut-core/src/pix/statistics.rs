//! Image statistics operations
//!
//! This module provides functions for computing statistics on pixel values:
//!
//! - Pixel counting (for binary images), whole image and by row
//! - Gray-level histograms
//! - Gray-level mean and standard deviation via [`GrayStats`]

use super::{Pix, PixelDepth};
use crate::color;
use crate::error::{Error, Result};

/// Mask of the valid pixel bits in the last word of a 1 bpp row.
fn last_word_mask(width: u32) -> u32 {
    match width & 31 {
        0 => u32::MAX,
        rem => u32::MAX << (32 - rem),
    }
}

impl Pix {
    /// Count the number of ON (foreground) pixels in a binary image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 1 bpp.
    pub fn count_pixels(&self) -> Result<u64> {
        Ok(self
            .count_pixels_by_row()?
            .iter()
            .map(|&n| u64::from(n))
            .sum())
    }

    /// Count the ON pixels of each row of a binary image.
    ///
    /// Padding bits past the image width are not counted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 1 bpp.
    pub fn count_pixels_by_row(&self) -> Result<Vec<u32>> {
        if self.depth() != PixelDepth::Bit1 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        let full_words = (self.width() / 32) as usize;
        let mask = last_word_mask(self.width());
        let has_partial = self.width() % 32 != 0;

        let counts = (0..self.height())
            .map(|y| {
                let line = self.row_data(y);
                let mut n: u32 = line[..full_words].iter().map(|w| w.count_ones()).sum();
                if has_partial {
                    n += (line[full_words] & mask).count_ones();
                }
                n
            })
            .collect();
        Ok(counts)
    }

    /// Histogram of gray levels.
    ///
    /// 8 bpp images are counted directly; 32 bpp images are counted by
    /// their luma.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] for 1 bpp images.
    pub fn gray_histogram(&self) -> Result<[u32; 256]> {
        let mut hist = [0u32; 256];
        match self.depth() {
            PixelDepth::Bit8 => {
                for y in 0..self.height() {
                    for x in 0..self.width() {
                        hist[self.get_pixel_unchecked(x, y) as usize] += 1;
                    }
                }
            }
            PixelDepth::Bit32 => {
                for y in 0..self.height() {
                    for &pixel in self.row_data(y) {
                        hist[color::luma_of(pixel) as usize] += 1;
                    }
                }
            }
            PixelDepth::Bit1 => return Err(Error::UnsupportedDepth(1)),
        }
        Ok(hist)
    }

    /// Gray-level statistics of the whole image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] for 1 bpp images.
    pub fn gray_stats(&self) -> Result<GrayStats> {
        Ok(GrayStats::from_histogram(self.gray_histogram()?))
    }
}

/// Summary statistics of a gray-level histogram
#[derive(Debug, Clone, PartialEq)]
pub struct GrayStats {
    histogram: [u32; 256],
    count: u64,
    mean: f64,
    std_dev: f64,
}

impl GrayStats {
    /// Compute the mean and population standard deviation of `histogram`.
    pub fn from_histogram(histogram: [u32; 256]) -> Self {
        let count: u64 = histogram.iter().map(|&n| u64::from(n)).sum();
        if count == 0 {
            return GrayStats {
                histogram,
                count,
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let total = count as f64;
        let mean = histogram
            .iter()
            .enumerate()
            .map(|(v, &n)| v as f64 * f64::from(n))
            .sum::<f64>()
            / total;
        let variance = histogram
            .iter()
            .enumerate()
            .map(|(v, &n)| {
                let d = v as f64 - mean;
                d * d * f64::from(n)
            })
            .sum::<f64>()
            / total;

        GrayStats {
            histogram,
            count,
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// The underlying histogram.
    pub fn histogram(&self) -> &[u32; 256] {
        &self.histogram
    }

    /// Total number of pixels counted.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean gray level.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of the gray level.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Number of pixels with gray level strictly below `level`.
    pub fn count_below(&self, level: u8) -> u64 {
        self.histogram[..level as usize]
            .iter()
            .map(|&n| u64::from(n))
            .sum()
    }

    /// Number of pixels with gray level strictly above `level`.
    pub fn count_above(&self, level: u8) -> u64 {
        self.histogram[level as usize + 1..]
            .iter()
            .map(|&n| u64::from(n))
            .sum()
    }

    /// Most frequent gray level and its pixel count.
    ///
    /// Ties resolve to the lowest level. Returns `None` for an empty
    /// histogram.
    pub fn mode(&self) -> Option<(u8, u32)> {
        if self.count == 0 {
            return None;
        }
        let mut best = (0u8, 0u32);
        for (v, &n) in self.histogram.iter().enumerate() {
            if n > best.1 {
                best = (v as u8, n);
            }
        }
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixMut;

    #[test]
    fn test_count_pixels_by_row_ignores_padding() {
        let mut pm = PixMut::new(35, 3, PixelDepth::Bit1).unwrap();
        pm.fill(1);
        pm.row_data_mut(1).iter_mut().for_each(|w| *w = 0);
        pm.set_pixel(34, 1, 1).unwrap();
        let pix: Pix = pm.into();

        assert_eq!(pix.count_pixels_by_row().unwrap(), vec![35, 1, 35]);
        assert_eq!(pix.count_pixels().unwrap(), 71);
    }

    #[test]
    fn test_count_pixels_rejects_gray() {
        let pix = Pix::new(4, 4, PixelDepth::Bit8).unwrap();
        assert!(pix.count_pixels_by_row().is_err());
    }

    #[test]
    fn test_gray_histogram_32bpp_uses_luma() {
        let mut pm = PixMut::new(3, 1, PixelDepth::Bit32).unwrap();
        pm.set_rgb(0, 0, 255, 0, 0).unwrap();
        pm.set_rgb(1, 0, 255, 0, 0).unwrap();
        pm.set_rgb(2, 0, 255, 255, 255).unwrap();
        let hist = Pix::from(pm).gray_histogram().unwrap();
        assert_eq!(hist[76], 2);
        assert_eq!(hist[255], 1);
    }

    #[test]
    fn test_gray_stats_mean_and_std_dev() {
        let mut hist = [0u32; 256];
        hist[0] = 50;
        hist[100] = 50;
        let stats = GrayStats::from_histogram(hist);
        assert_eq!(stats.count(), 100);
        assert!((stats.mean() - 50.0).abs() < 1e-9);
        assert!((stats.std_dev() - 50.0).abs() < 1e-9);
        assert_eq!(stats.count_below(50), 50);
        assert_eq!(stats.count_above(99), 50);
        assert_eq!(stats.count_above(100), 0);
        assert_eq!(stats.mode(), Some((0, 50)));
    }

    #[test]
    fn test_gray_stats_uniform_image() {
        let mut pm = PixMut::new(10, 10, PixelDepth::Bit8).unwrap();
        pm.fill(200);
        let stats = Pix::from(pm).gray_stats().unwrap();
        assert_eq!(stats.std_dev(), 0.0);
        assert_eq!(stats.mode(), Some((200, 100)));
        assert_eq!(stats.count_above(255), 0);
    }
}
