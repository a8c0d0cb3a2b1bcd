//! stripcut-io - Image I/O for stripcut
//!
//! Reads and writes the two formats comic strips travel in:
//!
//! - PNG (feature `png-format`)
//! - JPEG (feature `jpeg`)
//!
//! The input format is detected from the data, never from a file name.

mod error;
pub mod format;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes, format_from_extension};
pub use stripcut_core::ImageFormat;

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use stripcut_core::Pix;

/// Options for encoding images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Output format
    pub format: ImageFormat,
    /// JPEG quality (1-100); ignored for PNG
    pub jpeg_quality: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            jpeg_quality: 90,
        }
    }
}

impl WriteOptions {
    /// Options for `format` at the default quality.
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Set the JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }
}

/// Read an image from a file path.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let data = std::fs::read(path)?;
    read_image_mem(&data)
}

/// Read an image from an in-memory buffer.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] if the data is not PNG or JPEG
/// (or the codec is not enabled) and a decode error if the data is
/// truncated or corrupt.
pub fn read_image_mem(data: &[u8]) -> IoResult<Pix> {
    match detect_format_from_bytes(data)? {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(Cursor::new(data)),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(Cursor::new(data)),
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support is not enabled",
            other
        ))),
    }
}

/// Write an image to a file path with default options for `format`.
pub fn write_image<P: AsRef<Path>>(pix: &Pix, path: P, format: ImageFormat) -> IoResult<()> {
    write_image_with(pix, path, &WriteOptions::new(format))
}

/// Write an image to a file path.
pub fn write_image_with<P: AsRef<Path>>(
    pix: &Pix,
    path: P,
    options: &WriteOptions,
) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_image_to(pix, &mut writer, options)?;
    writer.flush()?;
    Ok(())
}

/// Encode an image into a new buffer with default options for `format`.
pub fn write_image_mem(pix: &Pix, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_image_to(pix, &mut buf, &WriteOptions::new(format))?;
    Ok(buf)
}

/// Encode an image into any writer.
pub fn write_image_to<W: Write>(pix: &Pix, writer: W, options: &WriteOptions) -> IoResult<()> {
    match options.format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(pix, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg(pix, writer, options.jpeg_quality),
        other => {
            let _ = writer;
            Err(IoError::UnsupportedFormat(format!(
                "cannot write {:?}",
                other
            )))
        }
    }
}
