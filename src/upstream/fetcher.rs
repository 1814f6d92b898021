//! Media retrieval.
//!
//! Resolves a locator to raw bytes. Inline bytes pass straight through;
//! URLs are fetched once, with a timeout and the spoofed User-Agent.
//! No caching: identical locators across turns are re-fetched from scratch.

use super::{Locator, NetworkError};
use crate::config::SPOOFED_USER_AGENT;
use bytes::Bytes;
use std::time::Duration;
use tracing::info;

/// Fetches referenced media over HTTP when it is not already in hand.
pub struct MediaFetcher {
    http: reqwest::Client,
    timeout: Duration,
}

impl MediaFetcher {
    /// Create a fetcher with the variant's media timeout.
    #[must_use]
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Resolve a locator to media bytes.
    ///
    /// # Errors
    ///
    /// `NetworkError::FetchFailed` on a non-200 status,
    /// `NetworkError::Timeout` / `NetworkError::ConnectionFailed` on
    /// transport failures. Inline locators cannot fail.
    pub async fn resolve(&self, locator: Locator) -> Result<Bytes, NetworkError> {
        match locator {
            Locator::Inline(bytes) => Ok(bytes),
            Locator::Url(url) => self.download(&url).await,
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes, NetworkError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, SPOOFED_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(NetworkError::FetchFailed { status });
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        info!(url = %url, size = bytes.len(), "media downloaded");
        Ok(bytes)
    }
}

fn map_transport_error(err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout
    } else {
        NetworkError::ConnectionFailed(err.to_string())
    }
}
