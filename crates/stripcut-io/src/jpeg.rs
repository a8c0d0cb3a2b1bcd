//! JPEG image format support
//!
//! Reads JPEG images using the `jpeg-decoder` crate and writes them with
//! `jpeg-encoder`.
//!
//! - 8-bit grayscale decodes to an 8 bpp `Pix`, 16-bit grayscale is
//!   reduced to its high byte
//! - 24-bit RGB decodes to a 32 bpp `Pix`
//! - CMYK is rejected
//!
//! Baseline JPEG stores dimensions in 16 bits, so images taller or wider
//! than 65535 pixels cannot be written.

use crate::{IoError, IoResult};
use jpeg_decoder::{Decoder, PixelFormat};
use jpeg_encoder::{ColorType, Encoder};
use std::io::{Read, Write};
use stripcut_core::{ImageFormat, Pix, PixMut, PixelDepth, color};

/// Largest width or height a JPEG file can carry.
pub const JPEG_MAX_DIMENSION: u32 = u16::MAX as u32;

/// Default encoder quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Read a JPEG image from a reader.
///
/// The reader must be positioned at the JPEG SOI marker (`FF D8`).
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    let data = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG header missing after decode".to_string()))?;

    let width = u32::from(info.width);
    let height = u32::from(info.height);

    let (depth, samples) = match info.pixel_format {
        PixelFormat::L8 => (PixelDepth::Bit8, 1usize),
        PixelFormat::L16 => (PixelDepth::Bit8, 2),
        PixelFormat::RGB24 => (PixelDepth::Bit32, 3),
        PixelFormat::CMYK32 => {
            return Err(IoError::UnsupportedFormat(
                "CMYK JPEG is not supported".to_string(),
            ));
        }
    };

    let row_bytes = width as usize * samples;
    if data.len() < row_bytes * height as usize {
        return Err(IoError::InvalidData(format!(
            "JPEG decoded {} bytes, expected {}",
            data.len(),
            row_bytes * height as usize
        )));
    }

    let mut pix = PixMut::new(width, height, depth)?;
    pix.set_informat(ImageFormat::Jpeg);

    for (y, line) in data.chunks_exact(row_bytes).take(height as usize).enumerate() {
        let y = y as u32;
        match samples {
            3 => {
                let row = pix.row_data_mut(y);
                for (px, s) in row.iter_mut().zip(line.chunks_exact(3)) {
                    *px = color::compose_rgb(s[0], s[1], s[2]);
                }
            }
            // L16 samples are big-endian
            2 => {
                for (x, s) in line.chunks_exact(2).enumerate() {
                    pix.set_pixel_unchecked(x as u32, y, s[0] as u32);
                }
            }
            _ => {
                for (x, &g) in line.iter().enumerate() {
                    pix.set_pixel_unchecked(x as u32, y, g as u32);
                }
            }
        }
    }

    Ok(pix.into())
}

/// Write a JPEG image at the given quality (clamped to 1-100).
///
/// 32 bpp images are written as RGB; any alpha channel is dropped, so
/// callers flatten transparency first. 1 and 8 bpp images are written
/// as grayscale.
///
/// # Errors
///
/// Returns [`IoError::TooLarge`] if either dimension exceeds
/// [`JPEG_MAX_DIMENSION`].
pub fn write_jpeg<W: Write>(pix: &Pix, writer: W, quality: u8) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();
    if width > JPEG_MAX_DIMENSION || height > JPEG_MAX_DIMENSION {
        return Err(IoError::TooLarge {
            format: "JPEG",
            width,
            height,
            limit: JPEG_MAX_DIMENSION,
        });
    }

    let (data, color_type) = match pix.depth() {
        PixelDepth::Bit32 => {
            let mut data = Vec::with_capacity(width as usize * height as usize * 3);
            for y in 0..height {
                for &pixel in pix.row_data(y) {
                    let (r, g, b) = color::extract_rgb(pixel);
                    data.extend_from_slice(&[r, g, b]);
                }
            }
            (data, ColorType::Rgb)
        }
        PixelDepth::Bit1 | PixelDepth::Bit8 => {
            let gray = pix.convert_to_8()?;
            let mut data = Vec::with_capacity(width as usize * height as usize);
            for y in 0..height {
                for x in 0..width {
                    data.push(gray.get_pixel_unchecked(x, y) as u8);
                }
            }
            (data, ColorType::Luma)
        }
    };

    let encoder = Encoder::new(writer, quality.clamp(1, 100));
    encoder
        .encode(&data, width as u16, height as u16, color_type)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn gradient(w: u32, h: u32) -> Pix {
        let mut pm = PixMut::new(w, h, PixelDepth::Bit32).unwrap();
        for y in 0..h {
            for x in 0..w {
                let v = ((x * 255) / w.max(1)) as u8;
                pm.set_rgb(x, y, v, v, 128).unwrap();
            }
        }
        pm.into()
    }

    #[test]
    fn test_jpeg_write_then_read_rgb() {
        let pix = gradient(40, 24);
        let mut buffer = Vec::new();
        write_jpeg(&pix, &mut buffer, 95).unwrap();
        assert_eq!(&buffer[..2], &[0xFF, 0xD8]);

        let pix2 = read_jpeg(Cursor::new(buffer)).unwrap();
        assert_eq!((pix2.width(), pix2.height()), (40, 24));
        assert_eq!(pix2.depth(), PixelDepth::Bit32);
        assert_eq!(pix2.informat(), ImageFormat::Jpeg);

        // Lossy, but a smooth gradient survives closely
        let (r, _, b) = pix2.get_rgb(20, 12).unwrap();
        let (r0, _, b0) = pix.get_rgb(20, 12).unwrap();
        assert!((r as i32 - r0 as i32).abs() <= 12);
        assert!((b as i32 - b0 as i32).abs() <= 12);
    }

    #[test]
    fn test_jpeg_gray_stays_gray() {
        let mut pm = PixMut::new(16, 16, PixelDepth::Bit8).unwrap();
        pm.fill(200);
        let pix: Pix = pm.into();

        let mut buffer = Vec::new();
        write_jpeg(&pix, &mut buffer, 90).unwrap();
        let pix2 = read_jpeg(Cursor::new(buffer)).unwrap();
        assert_eq!(pix2.depth(), PixelDepth::Bit8);
        let v = pix2.get_pixel(8, 8).unwrap() as i32;
        assert!((v - 200).abs() <= 3);
    }

    #[test]
    fn test_jpeg_rejects_oversize() {
        let pix = Pix::new(1, JPEG_MAX_DIMENSION + 1, PixelDepth::Bit8).unwrap();
        let err = write_jpeg(&pix, Vec::new(), 90).unwrap_err();
        assert!(matches!(err, IoError::TooLarge { .. }));
    }

    #[test]
    fn test_jpeg_garbage_is_decode_error() {
        let err = read_jpeg(Cursor::new(vec![0xFF, 0xD8, 0xFF, 0x00, 0x01])).unwrap_err();
        assert!(matches!(err, IoError::DecodeError(_)));
    }
}
