//! PNG image format support
//!
//! Decoding asks the `png` crate to expand palettes, low bit depths and
//! `tRNS` transparency and to strip 16-bit samples, so every file arrives
//! as 8-bit gray, gray+alpha, RGB or RGBA:
//!
//! - gray is read as an 8 bpp `Pix`
//! - everything else is read as 32 bpp, with `spp == 4` when alpha is present
//!
//! Encoding writes 8 bpp as grayscale and 32 bpp as RGB or RGBA.

use crate::{IoError, IoResult};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};
use stripcut_core::{ImageFormat, Pix, PixMut, PixelDepth, color};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unexpected PNG output depth: {:?}",
            bit_depth
        )));
    }

    let (depth, spp, samples) = match color_type {
        ColorType::Grayscale => (PixelDepth::Bit8, 1, 1usize),
        ColorType::GrayscaleAlpha => (PixelDepth::Bit32, 4, 2),
        ColorType::Rgb => (PixelDepth::Bit32, 3, 3),
        ColorType::Rgba => (PixelDepth::Bit32, 4, 4),
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "PNG palette was not expanded".to_string(),
            ));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    if bytes_per_row < width as usize * samples {
        return Err(IoError::InvalidData(format!(
            "PNG row of {} bytes is too short for width {}",
            bytes_per_row, width
        )));
    }

    let mut pix = PixMut::new(width, height, depth)?;
    pix.set_spp(spp);
    pix.set_informat(ImageFormat::Png);

    for (y, line) in data.chunks_exact(bytes_per_row).take(height as usize).enumerate() {
        let y = y as u32;
        let line = &line[..width as usize * samples];
        match color_type {
            ColorType::Grayscale => {
                for (x, &g) in line.iter().enumerate() {
                    pix.set_pixel_unchecked(x as u32, y, g as u32);
                }
            }
            _ => {
                let row = pix.row_data_mut(y);
                for (px, s) in row.iter_mut().zip(line.chunks_exact(samples)) {
                    *px = match samples {
                        2 => color::compose_rgba(s[0], s[0], s[0], s[1]),
                        3 => color::compose_rgb(s[0], s[1], s[2]),
                        _ => color::compose_rgba(s[0], s[1], s[2], s[3]),
                    };
                }
            }
        }
    }

    Ok(pix.into())
}

/// Write a PNG image
///
/// 1 bpp images are written as 8-bit grayscale (ON pixels black).
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let pix = match pix.depth() {
        PixelDepth::Bit1 => pix.convert_to_8()?,
        _ => pix.clone(),
    };
    let width = pix.width();
    let height = pix.height();

    let (color_type, samples) = match pix.depth() {
        PixelDepth::Bit32 if pix.spp() == 4 => (ColorType::Rgba, 4usize),
        PixelDepth::Bit32 => (ColorType::Rgb, 3),
        _ => (ColorType::Grayscale, 1),
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let bytes_per_row = width as usize * samples;
    let mut data = vec![0u8; bytes_per_row * height as usize];

    for (y, out) in data.chunks_exact_mut(bytes_per_row).enumerate() {
        let y = y as u32;
        match color_type {
            ColorType::Grayscale => {
                for (x, b) in out.iter_mut().enumerate() {
                    *b = pix.get_pixel_unchecked(x as u32, y) as u8;
                }
            }
            _ => {
                for (&pixel, s) in pix.row_data(y).iter().zip(out.chunks_exact_mut(samples)) {
                    let (r, g, b, a) = color::extract_rgba(pixel);
                    s[0] = r;
                    s[1] = g;
                    s[2] = b;
                    if samples == 4 {
                        s[3] = a;
                    }
                }
            }
        }
    }

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}
