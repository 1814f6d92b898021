//! Telegram bot that relays user prompts (or links) to a third-party media
//! API and sends the resulting video or photo back.
//!
//! The pipeline per incoming message is
//! [`upstream::RequestDispatcher`] → [`upstream::normalize`] →
//! [`upstream::MediaFetcher`], orchestrated by [`bot::handlers::handle_prompt`].

/// Telegram-facing layer: handlers, placeholder lifecycle, message texts
pub mod bot;
/// Settings and deployment-variant profiles
pub mod config;
/// Upstream API plumbing: dispatch, normalization, media fetching
pub mod upstream;
/// Input validation
pub mod validate;
