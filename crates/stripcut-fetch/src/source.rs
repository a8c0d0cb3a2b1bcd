//! Panel byte sources
//!
//! The coordinator only needs "bytes for this URL". [`PanelSource`] is
//! that seam; [`HttpSource`] is the real network implementation.

use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::REFERER;
use std::time::Duration;
use tracing::debug;

/// Something that can retrieve the raw bytes of a panel image
#[async_trait]
pub trait PanelSource: Send + Sync {
    /// Fetch `url`, sending `referer` if given.
    async fn fetch(&self, url: &str, referer: Option<&str>) -> FetchResult<Vec<u8>>;
}

/// Options for the HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// Whole-request timeout (default: 15 s)
    pub timeout: Duration,
    /// Proxy URL applied to every scheme
    pub proxy: Option<String>,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            proxy: None,
            user_agent: format!("stripcut/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpOptions {
    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Route requests through a proxy
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the `User-Agent` header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches panels over HTTP(S) with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Build a client from `options`.
    pub fn new(options: &HttpOptions) -> FetchResult<Self> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .user_agent(options.user_agent.clone())
            .connect_timeout(options.timeout)
            .timeout(options.timeout);
        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PanelSource for HttpSource {
    async fn fetch(&self, url: &str, referer: Option<&str>) -> FetchResult<Vec<u8>> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        debug!(url, bytes = body.len(), "fetched panel");
        Ok(body.to_vec())
    }
}
