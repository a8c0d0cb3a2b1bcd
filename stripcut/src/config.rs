//! Configuration file
//!
//! Settings come from `config.toml` with three optional sections:
//!
//! ```toml
//! [segment]
//! min_run_height = 30
//! max_segment_height = 2500
//! background = "white"
//!
//! [fetch]
//! concurrency_limit = 10
//! max_attempts = 5
//!
//! [output]
//! format = "jpeg"
//! jpeg_quality = 90
//! auto_crop = true
//! ```
//!
//! Missing keys take the defaults shown. The file is looked up at
//! `--config <path>`, else `<config dir>/stripcut/config.toml`.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stripcut_core::ImageFormat;
use stripcut_fetch::{FetchOptions, HttpOptions, RetryPolicy};
use stripcut_io::WriteOptions;
use stripcut_segment::{Background, ClassifyOptions, OversizePolicy, RowPolicy, SegmentOptions};

/// Complete stripcut configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub segment: SegmentConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// `[segment]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentConfig {
    pub min_run_height: u32,
    pub max_segment_height: u32,
    /// `white` or `black`
    pub background: Background,
    /// `threshold`, `dominant` or `uniform`
    pub row_policy: RowPolicy,
    pub max_recursion_depth: u32,
    /// `keep` or `split`
    pub oversize: OversizePolicy,
    pub max_output_height: u32,
    pub dominant_fraction: f64,
    pub white_cutoff: u8,
    pub black_cutoff: u8,
    pub dark_cutoff: u8,
    pub light_cutoff: u8,
    pub min_extreme_pixels: u64,
    pub min_std_dev: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        let seg = SegmentOptions::default();
        let cls = ClassifyOptions::default();
        Self {
            min_run_height: seg.min_run_height,
            max_segment_height: seg.max_segment_height,
            background: Background::default(),
            row_policy: seg.row_policy,
            max_recursion_depth: seg.max_recursion_depth,
            oversize: seg.oversize,
            max_output_height: seg.max_output_height,
            dominant_fraction: cls.dominant_fraction,
            white_cutoff: cls.white_cutoff,
            black_cutoff: cls.black_cutoff,
            dark_cutoff: cls.dark_cutoff,
            light_cutoff: cls.light_cutoff,
            min_extreme_pixels: cls.min_extreme_pixels,
            min_std_dev: cls.min_std_dev,
        }
    }
}

/// `[fetch]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub concurrency_limit: usize,
    pub timeout_secs: u64,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
    /// Attempts per panel; unset retries forever
    pub max_attempts: Option<u32>,
    pub backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 10,
            timeout_secs: 15,
            proxy: None,
            user_agent: None,
            max_attempts: None,
            backoff_ms: 1000,
            backoff_multiplier: 1.0,
            max_backoff_ms: 1000,
        }
    }
}

/// Encoded format of written images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl From<OutputFormat> for ImageFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// `jpeg` (or `jpg`) or `png`
    pub format: OutputFormat,
    pub jpeg_quality: u8,
    /// Assemble and segment; when false, panels are written unchanged
    pub auto_crop: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            jpeg_quality: 90,
            auto_crop: true,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location
    /// is used if present, otherwise all defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// `<config dir>/stripcut/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("stripcut").join("config.toml"))
    }

    /// Background color of the strips.
    pub fn background(&self) -> Background {
        self.segment.background
    }

    /// Options for the gutter segmenter.
    pub fn segment_options(&self) -> Result<SegmentOptions, ConfigError> {
        let s = &self.segment;
        if s.min_run_height == 0 {
            return Err(invalid("segment.min_run_height", "0"));
        }
        if s.max_segment_height == 0 {
            return Err(invalid("segment.max_segment_height", "0"));
        }
        if s.max_output_height == 0 {
            return Err(invalid("segment.max_output_height", "0"));
        }
        if !(0.0..=1.0).contains(&s.dominant_fraction) {
            return Err(invalid(
                "segment.dominant_fraction",
                &s.dominant_fraction.to_string(),
            ));
        }

        let classify = ClassifyOptions::default()
            .with_dominant_fraction(s.dominant_fraction)
            .with_cutoffs(s.white_cutoff, s.black_cutoff)
            .with_extreme_cutoffs(s.dark_cutoff, s.light_cutoff)
            .with_significance(s.min_extreme_pixels, s.min_std_dev);
        Ok(SegmentOptions::default()
            .with_min_run_height(s.min_run_height)
            .with_max_segment_height(s.max_segment_height)
            .with_row_policy(s.row_policy)
            .with_classify(classify)
            .with_max_recursion_depth(s.max_recursion_depth)
            .with_oversize(s.oversize)
            .with_max_output_height(s.max_output_height))
    }

    /// Retry policy for panel fetches.
    pub fn retry_policy(&self) -> RetryPolicy {
        let f = &self.fetch;
        let policy = RetryPolicy::default().with_exponential_backoff(
            Duration::from_millis(f.backoff_ms),
            f.backoff_multiplier,
            Duration::from_millis(f.max_backoff_ms.max(f.backoff_ms)),
        );
        match f.max_attempts {
            Some(n) => policy.with_max_attempts(n),
            None => policy,
        }
    }

    /// Options for the fetch coordinator, without a staging directory.
    pub fn fetch_options(&self) -> Result<FetchOptions, ConfigError> {
        if self.fetch.concurrency_limit == 0 {
            return Err(invalid("fetch.concurrency_limit", "0"));
        }
        Ok(FetchOptions::default()
            .with_concurrency_limit(self.fetch.concurrency_limit)
            .with_retry(self.retry_policy())
            .with_background(self.background()))
    }

    /// Options for the HTTP client.
    pub fn http_options(&self) -> HttpOptions {
        let mut opts = HttpOptions::default().with_timeout(Duration::from_secs(self.fetch.timeout_secs));
        if let Some(proxy) = &self.fetch.proxy {
            opts = opts.with_proxy(proxy.clone());
        }
        if let Some(user_agent) = &self.fetch.user_agent {
            opts = opts.with_user_agent(user_agent.clone());
        }
        opts
    }

    /// Encoder options for written segments.
    pub fn write_options(&self) -> Result<WriteOptions, ConfigError> {
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(invalid(
                "output.jpeg_quality",
                &self.output.jpeg_quality.to_string(),
            ));
        }
        Ok(WriteOptions::new(self.output.format.into()).with_jpeg_quality(self.output.jpeg_quality))
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: format!("'{}' is not allowed", value),
    }
}
