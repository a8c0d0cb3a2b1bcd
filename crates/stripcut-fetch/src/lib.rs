//! stripcut-fetch - Concurrent panel fetching for stripcut
//!
//! Downloads the panel images of a chapter with bounded concurrency,
//! retries failures under a [`RetryPolicy`] and returns decoded
//! [`PanelFragment`](stripcut_segment::PanelFragment)s in their original
//! order.
//!
//! ```no_run
//! use std::sync::Arc;
//! use stripcut_fetch::{FetchOptions, HttpOptions, HttpSource, fetch_all};
//!
//! # async fn run() -> stripcut_fetch::FetchResult<()> {
//! let source = Arc::new(HttpSource::new(&HttpOptions::default())?);
//! let urls = vec!["https://example.com/1.jpg".to_string()];
//! let fragments = fetch_all(source, &urls, &FetchOptions::default()).await?;
//! assert_eq!(fragments[0].index, 1);
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
mod error;
pub mod retry;
pub mod source;

pub use coordinator::{FetchOptions, fetch_all};
pub use error::{FetchError, FetchResult};
pub use retry::RetryPolicy;
pub use source::{HttpOptions, HttpSource, PanelSource};
