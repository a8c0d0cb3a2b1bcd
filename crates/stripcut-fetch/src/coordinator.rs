//! Concurrent fetch coordinator
//!
//! [`fetch_all`] downloads every panel of a chapter with at most
//! `concurrency_limit` requests in flight. Each panel is retried under
//! the configured [`RetryPolicy`], normalized to RGB and returned in its
//! original position regardless of completion order.

use crate::retry::RetryPolicy;
use crate::source::PanelSource;
use crate::{FetchError, FetchResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stripcut_core::{ImageFormat, Pix};
use stripcut_segment::{Background, PanelFragment};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Options for [`fetch_all`]
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum number of panels fetched at once (default: 10)
    pub concurrency_limit: usize,
    /// `Referer` header sent with every request
    pub referer: Option<String>,
    /// Retry policy applied per panel
    pub retry: RetryPolicy,
    /// Color transparent pixels are composited onto (default: white)
    pub background: Background,
    /// If set, each decoded panel is also written as `<index>.png` here
    pub staging_dir: Option<PathBuf>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: 10,
            referer: None,
            retry: RetryPolicy::default(),
            background: Background::White,
            staging_dir: None,
        }
    }
}

impl FetchOptions {
    /// Set the concurrency limit
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Set the referer
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the background used to flatten transparency
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Stage decoded panels in `dir`
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }
}

/// Shared, read-only state of one [`fetch_all`] call
struct Job {
    source: Arc<dyn PanelSource>,
    referer: Option<String>,
    retry: RetryPolicy,
    matte: u32,
    staging_dir: Option<PathBuf>,
}

/// Fetch and decode every URL, returning fragments in index order.
///
/// Fragment `i` (1-based) comes from `urls[i - 1]`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidOptions`] for a zero concurrency limit,
/// [`FetchError::Staging`] if a staged file cannot be written and
/// [`FetchError::RetriesExhausted`] when a bounded retry policy gives up.
/// Outstanding fetches are cancelled on the first error.
pub async fn fetch_all(
    source: Arc<dyn PanelSource>,
    urls: &[String],
    options: &FetchOptions,
) -> FetchResult<Vec<PanelFragment>> {
    if options.concurrency_limit == 0 {
        return Err(FetchError::InvalidOptions(
            "concurrency_limit must be at least 1".to_string(),
        ));
    }
    if urls.is_empty() {
        return Ok(Vec::new());
    }
    let count = u32::try_from(urls.len())
        .map_err(|_| FetchError::InvalidOptions(format!("too many panels: {}", urls.len())))?;

    if let Some(dir) = &options.staging_dir {
        std::fs::create_dir_all(dir).map_err(|e| FetchError::Staging {
            path: dir.clone(),
            message: e.to_string(),
        })?;
    }

    let job = Arc::new(Job {
        source,
        referer: options.referer.clone(),
        retry: options.retry.clone(),
        matte: options.background.fill_pixel(),
        staging_dir: options.staging_dir.clone(),
    });
    let semaphore = Arc::new(Semaphore::new(options.concurrency_limit));
    let mut tasks = JoinSet::new();

    for (index, url) in (1..=count).zip(urls.iter().cloned()) {
        let job = Arc::clone(&job);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| FetchError::Task(e.to_string()))?;
            fetch_one(&job, index, &url).await
        });
    }

    let mut slots: Vec<Option<Pix>> = vec![None; urls.len()];
    while let Some(joined) = tasks.join_next().await {
        let fragment = joined.map_err(|e| FetchError::Task(e.to_string()))??;
        let slot = (fragment.index - 1) as usize;
        slots[slot] = Some(fragment.pix);
    }

    let fragments: Vec<PanelFragment> = slots
        .into_iter()
        .zip(1..)
        .filter_map(|(pix, index)| pix.map(|pix| PanelFragment::new(index, pix)))
        .collect();
    if fragments.len() != urls.len() {
        return Err(FetchError::Task(format!(
            "{} of {} panels missing",
            urls.len() - fragments.len(),
            urls.len()
        )));
    }

    info!(panels = fragments.len(), "fetched chapter panels");
    Ok(fragments)
}

/// Fetch one panel, retrying until it decodes or the policy gives up.
async fn fetch_one(job: &Job, index: u32, url: &str) -> FetchResult<PanelFragment> {
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        let err = match try_fetch(job, url).await {
            Ok(pix) => {
                if let Some(dir) = &job.staging_dir {
                    stage(dir, index, &pix)?;
                }
                debug!(index, attempt, "panel ready");
                return Ok(PanelFragment::new(index, pix));
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            return Err(err);
        }
        match job.retry.backoff_after(attempt) {
            Some(delay) => {
                warn!(index, url, attempt, error = %err, "panel fetch failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
            None => {
                return Err(FetchError::RetriesExhausted {
                    index,
                    url: url.to_string(),
                    attempts: attempt,
                    last_error: Box::new(err),
                });
            }
        }
    }
}

async fn try_fetch(job: &Job, url: &str) -> FetchResult<Pix> {
    let bytes = job.source.fetch(url, job.referer.as_deref()).await?;
    let pix = stripcut_io::read_image_mem(&bytes)?;
    Ok(pix.to_rgb(job.matte)?)
}

fn stage(dir: &Path, index: u32, pix: &Pix) -> FetchResult<()> {
    let path = dir.join(format!("{}.png", index));
    stripcut_io::write_image(pix, &path, ImageFormat::Png).map_err(|e| FetchError::Staging {
        path,
        message: e.to_string(),
    })
}
