//! Outbound request construction and dispatch.
//!
//! One GET per turn, a fixed timeout, a spoofed User-Agent and zero retries.
//! The two-step variants issue a second GET against the companion endpoint.

use super::{ApiResponse, NetworkError};
use crate::config::{VariantProfile, SPOOFED_USER_AGENT};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::info;

/// Builds and issues upstream requests for one deployment variant.
pub struct RequestDispatcher {
    http: reqwest::Client,
    generate_url: String,
    companion_url: Option<String>,
    query_param: String,
    request_timeout: Duration,
    fetch_timeout: Duration,
}

impl RequestDispatcher {
    /// Create a dispatcher bound to the variant's endpoints and timeouts.
    #[must_use]
    pub fn new(profile: &VariantProfile, http: reqwest::Client) -> Self {
        Self {
            http,
            generate_url: profile.generate_url(),
            companion_url: profile.companion_url(),
            query_param: profile.query_param.clone(),
            request_timeout: profile.request_timeout,
            fetch_timeout: profile.fetch_timeout,
        }
    }

    /// The exact first-stage URL for a given user input, percent-encoded.
    #[must_use]
    pub fn build_request_url(&self, user_text: &str) -> String {
        format!(
            "{}?{}={}",
            self.generate_url,
            self.query_param,
            urlencoding::encode(user_text)
        )
    }

    /// Issue the first-stage GET for the user's input.
    ///
    /// # Errors
    ///
    /// `NetworkError::Timeout` when the deadline elapses,
    /// `NetworkError::ConnectionFailed` on any other transport failure.
    /// A non-200 status is not an error here; classification belongs to the
    /// normalizer.
    pub async fn dispatch(&self, user_text: &str) -> Result<ApiResponse, NetworkError> {
        let url = self.build_request_url(user_text);
        info!(url = %url, "dispatching upstream request");
        self.get(&url, self.request_timeout).await
    }

    /// Issue the companion-endpoint GET for a two-step identifier.
    ///
    /// # Errors
    ///
    /// Same transport errors as [`dispatch`](Self::dispatch); also
    /// `NetworkError::ConnectionFailed` when this variant has no companion
    /// endpoint configured (the upstream handed back an id we cannot follow).
    pub async fn fetch_by_id(&self, id: &str) -> Result<ApiResponse, NetworkError> {
        let Some(companion) = &self.companion_url else {
            return Err(NetworkError::ConnectionFailed(
                "no companion endpoint configured for this variant".to_string(),
            ));
        };
        let url = format!("{companion}?id={}", urlencoding::encode(id));
        info!(url = %url, "fetching media by id");
        self.get(&url, self.fetch_timeout).await
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<ApiResponse, NetworkError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, SPOOFED_USER_AGENT)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.bytes().await.map_err(map_transport_error)?;

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

fn map_transport_error(err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout
    } else {
        NetworkError::ConnectionFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{VariantMode, VariantProfile};

    fn dispatcher_for(mode: VariantMode) -> RequestDispatcher {
        RequestDispatcher::new(&VariantProfile::defaults_for(mode), reqwest::Client::new())
    }

    #[test]
    fn test_prompt_is_percent_encoded() {
        let dispatcher = dispatcher_for(VariantMode::Generate);
        let url = dispatcher.build_request_url("a girl dancing");
        assert!(url.ends_with("/generate?prompt=a%20girl%20dancing"), "{url}");
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        let dispatcher = dispatcher_for(VariantMode::Download);
        let url = dispatcher.build_request_url("https://example.com/a?b=c&d=e");
        assert!(
            url.ends_with("/download?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De"),
            "{url}"
        );
    }

    #[tokio::test]
    async fn test_fetch_by_id_requires_companion_endpoint() {
        // download variant is single-step
        let dispatcher = dispatcher_for(VariantMode::Download);
        let err = dispatcher
            .fetch_by_id("abc")
            .await
            .expect_err("must fail without a companion endpoint");
        assert!(matches!(err, NetworkError::ConnectionFailed(_)));
    }
}
