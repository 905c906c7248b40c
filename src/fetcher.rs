//! Raw HTML retrieval over plain HTTP
//!
//! The fetch is a single GET with the configured User-Agent. No retries are
//! made and no timeout is enforced unless one is configured.

use crate::{bytes_to_megabytes, FetchError};
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Body and declared size of a fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// Response body decoded as text
    pub raw_html: String,
    /// Declared `Content-Length` in megabytes, `None` when the server sent none
    pub transfer_size_mb: Option<f64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// [`ContentFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent())
            .send()
            .await?;

        let transfer_size_mb = declared_content_length(response.headers()).map(bytes_to_megabytes);
        debug!(
            "Fetched {} with status {} (content-length: {:?})",
            url,
            response.status(),
            response.headers().get(CONTENT_LENGTH)
        );

        let raw_html = response.text().await?;

        Ok(FetchedPage {
            raw_html,
            transfer_size_mb,
        })
    }
}

/// `Content-Length` in bytes, if present and a valid unsigned integer.
pub fn declared_content_length(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}
