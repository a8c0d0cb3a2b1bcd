//! Segment sinks
//!
//! The segmenter hands every kept segment to a [`SegmentSink`] together
//! with its 1-based output index. [`DirSink`] encodes segments to files
//! named `<index>.<ext>`; [`MemorySink`] keeps them in memory.

use crate::SegmentResult;
use std::fs;
use std::path::{Path, PathBuf};
use stripcut_core::Pix;
use stripcut_io::WriteOptions;
use tracing::debug;

/// Receiver of segmented output
pub trait SegmentSink {
    /// Persist one segment. Indices arrive in increasing order starting
    /// at 1.
    fn write_segment(&mut self, index: u32, segment: &Pix) -> SegmentResult<()>;
}

impl<S: SegmentSink + ?Sized> SegmentSink for &mut S {
    fn write_segment(&mut self, index: u32, segment: &Pix) -> SegmentResult<()> {
        (**self).write_segment(index, segment)
    }
}

/// Writes segments as image files into one directory
#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
    options: WriteOptions,
    written: Vec<(u32, PathBuf)>,
}

impl DirSink {
    /// Create a sink writing into `dir`, creating it if needed.
    pub fn new<P: AsRef<Path>>(dir: P, options: WriteOptions) -> SegmentResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            options,
            written: Vec::new(),
        })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a segment with `index` is written to.
    pub fn path_for(&self, index: u32) -> PathBuf {
        self.dir
            .join(format!("{}.{}", index, self.options.format.extension()))
    }

    /// Indices and paths written so far, in write order.
    pub fn written(&self) -> &[(u32, PathBuf)] {
        &self.written
    }

    /// Consume the sink, returning what it wrote.
    pub fn into_written(self) -> Vec<(u32, PathBuf)> {
        self.written
    }
}

impl SegmentSink for DirSink {
    fn write_segment(&mut self, index: u32, segment: &Pix) -> SegmentResult<()> {
        let path = self.path_for(index);
        let rgb = segment.to_rgb(stripcut_core::color::WHITE)?;
        stripcut_io::write_image_with(&rgb, &path, &self.options)?;
        debug!(index, path = %path.display(), height = segment.height(), "wrote segment");
        self.written.push((index, path));
        Ok(())
    }
}

/// Collects segments in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    segments: Vec<(u32, Pix)>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments received so far, with their indices.
    pub fn segments(&self) -> &[(u32, Pix)] {
        &self.segments
    }

    /// Number of segments received.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no segment was received.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Consume the sink, returning the segment images in index order.
    pub fn into_images(self) -> Vec<Pix> {
        self.segments.into_iter().map(|(_, pix)| pix).collect()
    }
}

impl SegmentSink for MemorySink {
    fn write_segment(&mut self, index: u32, segment: &Pix) -> SegmentResult<()> {
        self.segments.push((index, segment.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stripcut_core::{ImageFormat, PixelDepth};

    #[test]
    fn test_dir_sink_names_files_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirSink::new(dir.path().join("out"), WriteOptions::default()).unwrap();
        let pix = Pix::new(8, 8, PixelDepth::Bit32).unwrap();
        sink.write_segment(1, &pix).unwrap();
        sink.write_segment(2, &pix).unwrap();

        let written = sink.into_written();
        assert_eq!(written.len(), 2);
        assert!(written[0].1.ends_with("out/1.jpg"));
        assert!(written[1].1.exists());
        assert_eq!(
            stripcut_io::detect_format(&written[1].1).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_dir_sink_png() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirSink::new(dir.path(), WriteOptions::new(ImageFormat::Png)).unwrap();
        assert!(sink.path_for(12).ends_with("12.png"));
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());
        let pix = Pix::new(2, 2, PixelDepth::Bit32).unwrap();
        sink.write_segment(1, &pix).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.segments()[0].0, 1);
    }
}
