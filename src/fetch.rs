//! Page download.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue};

/// User agent sent with every page and image request.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; getwebsite/1.0)";

const PAGE_TIMEOUT: Duration = Duration::from_secs(15);
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },
}

/// Downloads the raw bytes of a page.
pub trait Fetcher {
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure or a non-success status.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking reqwest client with a 15 second deadline.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Fails if the TLS backend or client configuration cannot be set up.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(PAGE_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let _scope = crate::perf::scope("fetch.page");
        tracing::info!(url, "fetching page");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(ACCEPT_HTML))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "page request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes()?.to_vec();
        tracing::info!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}

/// Prefix `https://` when the input has no scheme.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
