//! Upstream API plumbing: request dispatch, response normalization and
//! media fetching.
//!
//! The upstream is an uncontrolled third-party endpoint whose responses vary
//! between JSON envelopes, raw media bytes and error payloads; everything in
//! this module exists to turn that mess into one of a few well-typed outcomes.

pub mod dispatcher;
pub mod fetcher;
pub mod normalizer;

pub use dispatcher::RequestDispatcher;
pub use fetcher::MediaFetcher;
pub use normalizer::normalize;

use crate::config::VariantProfile;
use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

/// Raw upstream HTTP response, owned transiently per request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` header value, empty string when absent
    pub content_type: String,
    /// Raw response body
    pub body: Bytes,
}

/// Kind of media the upstream produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Video attachment
    Video,
    /// Photo attachment
    Photo,
}

/// Reference to retrievable media: a remote URL or bytes already in hand.
/// Never both at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Remote URL that still has to be fetched
    Url(String),
    /// Media bytes delivered inline in the upstream response
    Inline(Bytes),
}

/// Error the upstream reported or implied, as classified by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Non-200 HTTP status; the body is never inspected in this case
    #[error("request failed with status {0}")]
    Status(u16),
    /// Body claimed to be JSON but did not parse
    #[error("invalid response format")]
    Format,
    /// The upstream's own error field, surfaced verbatim
    #[error("{0}")]
    Reported(String),
}

/// Outcome of classifying one upstream response. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedResult {
    /// The response represents a failure
    Error(UpstreamError),
    /// A media reference was extracted
    Media {
        /// Photo or video
        kind: MediaKind,
        /// Where the bytes are
        locator: Locator,
    },
    /// The upstream returned an identifier; the media must be retrieved from
    /// the companion endpoint in a second step
    Pending {
        /// Opaque identifier to pass to the companion endpoint
        id: String,
        /// Kind hint from the first-stage response
        kind: MediaKind,
    },
    /// Nothing recognizable; carried details are surfaced for diagnosis
    Unrecognized {
        /// `Content-Type` of the response
        content_type: String,
        /// Body size in bytes
        size: usize,
        /// Top-level JSON keys actually present, empty for non-JSON bodies
        keys: Vec<String>,
    },
}

/// Transport-level failure talking to the upstream
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request deadline elapsed
    #[error("request timed out")]
    Timeout,
    /// Connection could not be established or broke mid-flight
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// A media fetch came back with a non-200 status
    #[error("fetch failed with status {status}")]
    FetchFailed {
        /// HTTP status of the failed fetch
        status: u16,
    },
}

/// Closed taxonomy of everything that can go wrong in one conversation turn.
///
/// Converted to a user-visible message at the handler boundary; no variant is
/// ever silently dropped.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Input failed URL-shape validation (download variant only)
    #[error("input does not look like a link")]
    Validation,
    /// Upstream returned a non-200 status
    #[error("request failed with status {status}")]
    UpstreamStatus {
        /// HTTP status code
        status: u16,
    },
    /// Upstream body was unparseable
    #[error("invalid response format")]
    UpstreamFormat,
    /// Upstream reported an error of its own
    #[error("upstream error: {0}")]
    UpstreamReported(String),
    /// Upstream request timed out (single attempt, no retry)
    #[error("upstream request timed out")]
    UpstreamTimeout,
    /// Could not reach the upstream at all
    #[error("connection failed: {0}")]
    Connection(String),
    /// Secondary fetch of referenced media failed
    #[error("media fetch failed: {0}")]
    MediaFetch(String),
    /// Telegram rejected the outbound attachment
    #[error("media delivery failed: {0}")]
    MediaDelivery(String),
    /// Response shape matched nothing we know
    #[error("unrecognized response (content-type: {content_type}, {size} bytes)")]
    Unrecognized {
        /// `Content-Type` of the response
        content_type: String,
        /// Body size in bytes
        size: usize,
        /// Observed top-level JSON keys, if any
        keys: Vec<String>,
    },
    /// Failure outside the known taxonomy; logged and surfaced, never dropped
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<NetworkError> for TurnError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Timeout => Self::UpstreamTimeout,
            NetworkError::ConnectionFailed(detail) => Self::Connection(detail),
            NetworkError::FetchFailed { status } => {
                Self::MediaFetch(format!("status {status}"))
            }
        }
    }
}

/// Media ready to be delivered to the user
#[derive(Debug, Clone)]
pub struct MediaReply {
    /// Photo or video
    pub kind: MediaKind,
    /// The media bytes
    pub bytes: Bytes,
}

/// Identifier handed back by the first stage of the two-step protocol
#[derive(Debug, Clone)]
pub struct PendingMedia {
    /// Identifier to pass to the companion endpoint
    pub id: String,
    /// Kind hint from the first-stage response
    pub kind: MediaKind,
}

/// Result of the first stage of a turn
#[derive(Debug)]
pub enum Staged {
    /// Media bytes are already in hand
    Ready(MediaReply),
    /// A companion-endpoint fetch is still required
    Pending(PendingMedia),
}

/// High-level upstream client: dispatch, normalize and resolve in one place.
///
/// Shared across conversation turns; holds no per-turn state.
pub struct UpstreamClient {
    dispatcher: RequestDispatcher,
    fetcher: MediaFetcher,
}

impl UpstreamClient {
    /// Build the client for one deployment variant, sharing one HTTP client
    /// between the dispatcher and the fetcher.
    #[must_use]
    pub fn new(profile: &VariantProfile, http: reqwest::Client) -> Self {
        Self {
            dispatcher: RequestDispatcher::new(profile, http.clone()),
            fetcher: MediaFetcher::new(http, profile.fetch_timeout),
        }
    }

    /// First stage of a turn: dispatch the user input, classify the response
    /// and resolve direct media references to bytes.
    ///
    /// Returns [`Staged::Pending`] when the upstream handed back an identifier
    /// instead of media, so the caller can notify the user before the second
    /// stage.
    ///
    /// # Errors
    ///
    /// Any [`TurnError`] except `Validation` and `MediaDelivery`, which belong
    /// to the conversation layer.
    pub async fn begin(&self, user_text: &str) -> Result<Staged, TurnError> {
        let response = self.dispatcher.dispatch(user_text).await?;
        info!(
            status = response.status,
            content_type = %response.content_type,
            size = response.body.len(),
            "upstream response received"
        );

        match normalize(&response) {
            NormalizedResult::Media { kind, locator } => {
                let bytes = self.fetcher.resolve(locator).await.map_err(|e| match e {
                    NetworkError::FetchFailed { status } => {
                        TurnError::MediaFetch(format!("status {status}"))
                    }
                    other => TurnError::MediaFetch(other.to_string()),
                })?;
                Ok(Staged::Ready(MediaReply { kind, bytes }))
            }
            NormalizedResult::Pending { id, kind } => {
                Ok(Staged::Pending(PendingMedia { id, kind }))
            }
            NormalizedResult::Error(UpstreamError::Status(status)) => {
                Err(TurnError::UpstreamStatus { status })
            }
            NormalizedResult::Error(UpstreamError::Format) => Err(TurnError::UpstreamFormat),
            NormalizedResult::Error(UpstreamError::Reported(message)) => {
                Err(TurnError::UpstreamReported(message))
            }
            NormalizedResult::Unrecognized {
                content_type,
                size,
                keys,
            } => {
                warn!(
                    content_type = %content_type,
                    size,
                    ?keys,
                    "upstream response shape not recognized"
                );
                Err(TurnError::Unrecognized {
                    content_type,
                    size,
                    keys,
                })
            }
        }
    }

    /// Second stage of the two-step protocol: retrieve the media bytes from
    /// the companion endpoint.
    ///
    /// The companion response is not re-normalized; a 200 body is the media,
    /// anything else is a fetch failure. That matches the original protocol.
    ///
    /// # Errors
    ///
    /// `TurnError::MediaFetch` on a non-200 companion response, a transport
    /// failure, or when the variant has no companion endpoint configured.
    pub async fn complete(&self, pending: PendingMedia) -> Result<MediaReply, TurnError> {
        let response = self
            .dispatcher
            .fetch_by_id(&pending.id)
            .await
            .map_err(|e| TurnError::MediaFetch(e.to_string()))?;

        if response.status != 200 {
            return Err(TurnError::MediaFetch(format!(
                "status {}",
                response.status
            )));
        }

        info!(
            id = %pending.id,
            size = response.body.len(),
            "companion fetch complete"
        );
        Ok(MediaReply {
            kind: pending.kind,
            bytes: response.body,
        })
    }
}
