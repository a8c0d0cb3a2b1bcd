//! Canvas assembly
//!
//! Stacks panel fragments top to bottom into one tall RGB canvas. The
//! canvas is as wide as the widest fragment; narrower fragments are
//! centered and the margins take the background color.

use crate::classify::Background;
use crate::error::AssemblyError;
use stripcut_core::{Pix, PixMut, PixelDepth};
use tracing::debug;

/// One downloaded (or staged) panel image
#[derive(Debug, Clone)]
pub struct PanelFragment {
    /// 1-based position of the panel in its chapter
    pub index: u32,
    /// Decoded image
    pub pix: Pix,
}

impl PanelFragment {
    /// Create a fragment.
    pub fn new(index: u32, pix: Pix) -> Self {
        Self { index, pix }
    }

    /// Fragment width in pixels.
    pub fn width(&self) -> u32 {
        self.pix.width()
    }

    /// Fragment height in pixels.
    pub fn height(&self) -> u32 {
        self.pix.height()
    }
}

/// Stack fragments into one canvas in ascending index order.
///
/// Fragments that are not 32 bpp RGB are converted first; transparent
/// pixels are composited onto the background color.
///
/// # Errors
///
/// See [`AssemblyError`]: the set must be non-empty, indices must be
/// unique, and the summed height must fit in a `u32`.
pub fn assemble(fragments: &[PanelFragment], background: Background) -> Result<Pix, AssemblyError> {
    if fragments.is_empty() {
        return Err(AssemblyError::Empty);
    }

    let mut ordered: Vec<&PanelFragment> = fragments.iter().collect();
    ordered.sort_by_key(|f| f.index);
    if let Some(pair) = ordered.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(AssemblyError::DuplicateIndex(pair[0].index));
    }

    for f in &ordered {
        if f.width() == 0 || f.height() == 0 {
            return Err(AssemblyError::ZeroSized {
                index: f.index,
                width: f.width(),
                height: f.height(),
            });
        }
    }

    let max_width = ordered.iter().map(|f| f.width()).max().unwrap_or(0);
    let total_height: u64 = ordered.iter().map(|f| u64::from(f.height())).sum();
    let total_height = u32::try_from(total_height).map_err(|_| AssemblyError::TooTall(total_height))?;

    let matte = background.fill_pixel();
    let mut canvas = PixMut::new(max_width, total_height, PixelDepth::Bit32)?;
    canvas.fill(matte);

    let mut y_offset = 0;
    for f in ordered {
        let rgb = if f.pix.depth() == PixelDepth::Bit32 && f.pix.spp() == 3 {
            f.pix.clone()
        } else {
            f.pix.to_rgb(matte)?
        };
        let x_offset = (max_width - rgb.width()) / 2;
        canvas.paste(&rgb, x_offset, y_offset)?;
        y_offset += rgb.height();
    }

    debug!(
        fragments = fragments.len(),
        width = max_width,
        height = total_height,
        "assembled canvas"
    );
    Ok(canvas.into())
}
