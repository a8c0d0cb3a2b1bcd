//! Chapter manifests
//!
//! A manifest lists what a scraper found for one series:
//!
//! ```toml
//! title = "Tower of Paper"
//! author = "Someone"
//! referer = "https://reader.example/"
//!
//! [[chapters]]
//! title = "Prologue"
//! urls = ["https://cdn.example/p/1.jpg", "https://cdn.example/p/2.jpg"]
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// One series and its chapters, in reading order
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Series title
    pub title: String,
    /// Series author
    #[serde(default)]
    pub author: Option<String>,
    /// Referer used for chapters that do not set their own
    #[serde(default)]
    pub referer: Option<String>,
    /// Chapters; numbered from 1 in this order
    #[serde(default)]
    pub chapters: Vec<ChapterEntry>,
}

/// One chapter of a [`Manifest`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChapterEntry {
    /// Chapter title
    pub title: String,
    /// Referer for this chapter's panel requests
    #[serde(default)]
    pub referer: Option<String>,
    /// Panel image URLs, top to bottom
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Manifest {
    /// Parse a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a manifest file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Referer to send for `chapter`.
    pub fn referer_for<'a>(&'a self, chapter: &'a ChapterEntry) -> Option<&'a str> {
        chapter.referer.as_deref().or(self.referer.as_deref())
    }
}
