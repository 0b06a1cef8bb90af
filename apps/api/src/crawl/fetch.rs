//! HTTP fetching for the crawl adapters.
//!
//! Adapters never talk to `reqwest` directly; they go through [`Fetcher`] so
//! a run can be replayed against canned pages in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GETs `url` with the extra `headers` and returns the body as text.
    /// Non-2xx answers are errors.
    async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError>;
}

/// The production fetcher. One pooled client for the whole crawl.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("GET {url} -> {status}");
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
