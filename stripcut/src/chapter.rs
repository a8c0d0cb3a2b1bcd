//! Chapter processing
//!
//! A chapter goes through three stages: its panels are fetched (or read
//! from disk) into [`PanelFragment`]s, the fragments are assembled and
//! cut at gutters, and the segments are written as `<index>.<ext>` into
//! the chapter directory `<out>/<series>/<number:04> - <title>/`.
//!
//! [`ChapterRun`] drives a whole series. It numbers chapters, stages
//! downloaded panels under `<out>/<series>/.staging/` and decides what
//! happens when one chapter fails.

use crate::error::{ChapterError, ChapterResult};
use crate::manifest::Manifest;
use crate::naming::{chapter_dir_name, safe_file_name, sort_by_numeric_stem};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stripcut_fetch::{FetchOptions, PanelSource, fetch_all};
use stripcut_io::WriteOptions;
use stripcut_segment::{
    Background, DirSink, GutterSegmenter, PanelFragment, SegmentOptions, SegmentSink, assemble,
};
use tracing::{info, warn};

/// How a chapter's fragments become output images
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterOptions {
    /// Gutter segmentation settings
    pub segment: SegmentOptions,
    /// Background of the strip
    pub background: Background,
    /// Encoder settings for written images
    pub write: WriteOptions,
    /// Assemble and segment (default); when false every fragment is
    /// written unchanged
    pub auto_crop: bool,
}

impl Default for ChapterOptions {
    fn default() -> Self {
        Self {
            segment: SegmentOptions::default(),
            background: Background::White,
            write: WriteOptions::default(),
            auto_crop: true,
        }
    }
}

impl ChapterOptions {
    /// Set the segmentation settings
    pub fn with_segment(mut self, segment: SegmentOptions) -> Self {
        self.segment = segment;
        self
    }

    /// Set the background
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Set the encoder settings
    pub fn with_write(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }

    /// Enable or disable assembly and segmentation
    pub fn with_auto_crop(mut self, auto_crop: bool) -> Self {
        self.auto_crop = auto_crop;
        self
    }
}

/// The images written for one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterImageSet {
    /// 1-based chapter number
    pub number: u32,
    /// Chapter title as given
    pub title: String,
    /// Chapter output directory
    pub dir: PathBuf,
    /// Written files in index order
    pub images: Vec<PathBuf>,
}

/// Read panel images from disk as fragments numbered `1..=n`.
///
/// If every file has a numeric stem the files are ordered by that number
/// (`10.png` after `9.png`); otherwise the given order is kept.
pub fn load_fragments(paths: &[PathBuf]) -> ChapterResult<Vec<PanelFragment>> {
    let numbered = sort_by_numeric_stem(paths.iter().cloned());
    let ordered: Vec<PathBuf> = if numbered.len() == paths.len() {
        numbered.into_iter().map(|(_, p)| p).collect()
    } else {
        paths.to_vec()
    };

    ordered
        .into_iter()
        .zip(1..)
        .map(|(path, index)| {
            let pix = stripcut_io::read_image(&path)
                .map_err(|source| ChapterError::Image { path, source })?;
            Ok(PanelFragment::new(index, pix))
        })
        .collect()
}

/// Rebuild the fragment sequence from a staging directory.
///
/// PNG and JPEG files are ordered by numeric stem; anything else in the
/// directory is ignored.
pub fn load_staged_fragments<P: AsRef<Path>>(dir: P) -> ChapterResult<Vec<PanelFragment>> {
    let dir = dir.as_ref();
    let io_err = |source: std::io::Error| ChapterError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && stripcut_io::format_from_extension(&path).is_some() {
            files.push(path);
        }
    }
    let ordered: Vec<PathBuf> = sort_by_numeric_stem(files)
        .into_iter()
        .map(|(_, p)| p)
        .collect();
    load_fragments(&ordered)
}

/// Write one chapter's images into `out_dir`.
///
/// With auto-crop the fragments are assembled and segmented; without it
/// each fragment is written as is, renumbered in index order. Returns the
/// written paths.
pub fn write_chapter(
    fragments: &[PanelFragment],
    out_dir: &Path,
    options: &ChapterOptions,
) -> ChapterResult<Vec<PathBuf>> {
    if fragments.is_empty() {
        return Err(ChapterError::NoPanels(out_dir.display().to_string()));
    }
    let mut sink = DirSink::new(out_dir, options.write)?;

    if options.auto_crop {
        let canvas = assemble(fragments, options.background)?;
        GutterSegmenter::new(options.segment.clone()).segment(
            &canvas,
            options.background,
            &mut sink,
        )?;
    } else {
        let mut ordered: Vec<&PanelFragment> = fragments.iter().collect();
        ordered.sort_by_key(|f| f.index);
        for (fragment, index) in ordered.into_iter().zip(1..) {
            sink.write_segment(index, &fragment.pix)?;
        }
    }

    Ok(sink.into_written().into_iter().map(|(_, p)| p).collect())
}

/// A chapter that failed and was skipped
#[derive(Debug)]
pub struct SkippedChapter {
    pub number: u32,
    pub title: String,
    pub error: ChapterError,
}

/// Outcome of [`ChapterRun::run_manifest`]
#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<ChapterImageSet>,
    pub skipped: Vec<SkippedChapter>,
}

/// Processes the chapters of one series in order
#[derive(Debug)]
pub struct ChapterRun {
    series_dir: PathBuf,
    options: ChapterOptions,
    fetch: FetchOptions,
    keep_staging: bool,
    fail_fast: bool,
    next_number: u32,
}

impl ChapterRun {
    /// Start a run writing into `<out>/<series>/`.
    pub fn new(out: &Path, series: &str, options: ChapterOptions, fetch: FetchOptions) -> Self {
        Self {
            series_dir: out.join(safe_file_name(series)),
            options,
            fetch,
            keep_staging: false,
            fail_fast: false,
            next_number: 1,
        }
    }

    /// Keep staged panels after the run
    pub fn with_keep_staging(mut self, keep: bool) -> Self {
        self.keep_staging = keep;
        self
    }

    /// Abort the run on the first failed chapter instead of skipping it
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Series output directory.
    pub fn series_dir(&self) -> &Path {
        &self.series_dir
    }

    /// Root of the staging tree.
    pub fn staging_root(&self) -> PathBuf {
        self.series_dir.join(".staging")
    }

    /// Fetch, segment and write the next chapter.
    ///
    /// The chapter takes the next number even if it fails.
    pub async fn run_chapter(
        &mut self,
        source: Arc<dyn PanelSource>,
        title: &str,
        urls: &[String],
        referer: Option<&str>,
    ) -> ChapterResult<ChapterImageSet> {
        let number = self.next_number;
        self.next_number += 1;
        if urls.is_empty() {
            return Err(ChapterError::NoPanels(title.to_string()));
        }

        let dir_name = chapter_dir_name(number, title);
        let staging = self.staging_root().join(&dir_name);
        let mut fetch = self.fetch.clone().with_staging_dir(&staging);
        if let Some(referer) = referer {
            fetch = fetch.with_referer(referer);
        }
        let fragments = fetch_all(source, urls, &fetch).await?;

        let dir = self.series_dir.join(&dir_name);
        let images = write_chapter(&fragments, &dir, &self.options)?;
        if !self.keep_staging {
            remove_tree(&staging)?;
        }

        info!(
            number,
            title,
            panels = fragments.len(),
            images = images.len(),
            "chapter written"
        );
        Ok(ChapterImageSet {
            number,
            title: title.to_string(),
            dir,
            images,
        })
    }

    /// Process every chapter of `manifest`, then clean up staging.
    ///
    /// A failed chapter is logged and skipped, or with fail-fast ends the
    /// run with its error. Chapters already written are left in place
    /// either way.
    pub async fn run_manifest(
        &mut self,
        source: Arc<dyn PanelSource>,
        manifest: &Manifest,
    ) -> ChapterResult<RunSummary> {
        let mut summary = RunSummary::default();
        for chapter in &manifest.chapters {
            let number = self.next_number;
            let referer = manifest.referer_for(chapter);
            match self
                .run_chapter(Arc::clone(&source), &chapter.title, &chapter.urls, referer)
                .await
            {
                Ok(set) => summary.written.push(set),
                Err(error) if self.fail_fast => {
                    if let Err(cleanup) = self.finish() {
                        warn!(error = %cleanup, "staging cleanup failed");
                    }
                    return Err(error);
                }
                Err(error) => {
                    warn!(number, title = %chapter.title, %error, "skipping chapter");
                    summary.skipped.push(SkippedChapter {
                        number,
                        title: chapter.title.clone(),
                        error,
                    });
                }
            }
        }
        self.finish()?;
        Ok(summary)
    }

    /// Remove the staging tree unless staging is kept.
    pub fn finish(&self) -> ChapterResult<()> {
        if self.keep_staging {
            return Ok(());
        }
        remove_tree(&self.staging_root())
    }
}

fn remove_tree(path: &Path) -> ChapterResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ChapterError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
