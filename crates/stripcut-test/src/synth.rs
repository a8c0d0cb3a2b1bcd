//! Synthetic strip builders
//!
//! Tests describe a long strip as a stack of horizontal bands. Solid
//! bands model gutters and dividers; noise bands model drawn panels.
//! Noise is drawn from a seeded [`StdRng`] so every run builds the same
//! pixels.

use crate::error::TestResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stripcut_core::{Pix, PixMut, PixelDepth, color};

/// Content of one horizontal band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Every pixel is this gray level
    Solid(u8),
    /// Every pixel is a random gray level in `lo..=hi`
    Noise { lo: u8, hi: u8 },
}

/// Build a 32 bpp image of one solid gray level.
pub fn solid(w: u32, h: u32, gray: u8) -> TestResult<Pix> {
    let mut pm = PixMut::new(w, h, PixelDepth::Bit32)?;
    pm.fill(color::compose_rgb(gray, gray, gray));
    Ok(pm.into())
}

/// Build a 32 bpp image of seeded gray noise in `lo..=hi`.
pub fn noise(w: u32, h: u32, lo: u8, hi: u8, seed: u64) -> TestResult<Pix> {
    strip(w, &[(h, Band::Noise { lo, hi })], seed)
}

/// Build a 32 bpp strip from bands listed top to bottom.
pub fn strip(w: u32, bands: &[(u32, Band)], seed: u64) -> TestResult<Pix> {
    let total: u32 = bands.iter().map(|&(h, _)| h).sum();
    let mut pm = PixMut::new(w, total, PixelDepth::Bit32)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut y0 = 0;
    for &(h, band) in bands {
        for y in y0..y0 + h {
            let row = pm.row_data_mut(y);
            for px in row.iter_mut() {
                let g = match band {
                    Band::Solid(g) => g,
                    Band::Noise { lo, hi } => rng.gen_range(lo..=hi),
                };
                *px = color::compose_rgb(g, g, g);
            }
        }
        y0 += h;
    }
    Ok(pm.into())
}

/// Stack images vertically, centering narrower ones on a `matte` field.
pub fn stack(images: &[Pix], matte: u8) -> TestResult<Pix> {
    let w = images.iter().map(Pix::width).max().unwrap_or(1);
    let h: u32 = images.iter().map(Pix::height).sum::<u32>().max(1);
    let mut pm = PixMut::new(w, h, PixelDepth::Bit32)?;
    pm.fill(color::compose_rgb(matte, matte, matte));

    let mut y = 0;
    for img in images {
        let img = img.convert_to_32()?;
        pm.paste(&img, (w - img.width()) / 2, y)?;
        y += img.height();
    }
    Ok(pm.into())
}
