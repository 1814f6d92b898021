//! User-facing message templates.
//!
//! Every terminal state of a conversation turn maps to exactly one of these.

use crate::config::{VariantMode, VariantProfile};
use crate::upstream::{MediaKind, TurnError};

/// `/start` welcome, HTML-formatted.
pub const WELCOME_HTML: &str = "Hi! \u{1f44b}\n\n\
I can create videos from your text prompts! \u{1f3ac}\n\n\
Just send me a text description and I'll generate a video for you.\n\n\
Example: \"a girl dancing\" or \"sunset over mountains\"\n\n\
<b>Commands:</b>\n\
/start - Show this message\n\
/help - Get help";

/// `/help` usage text, Markdown-formatted.
pub const HELP_MARKDOWN: &str = "\u{1f4d6} *How to use this bot:*\n\n\
1. Send me a text prompt describing the video you want\n\
2. Wait while I generate your video (this may take 1-2 minutes)\n\
3. I'll send you the video once it's ready!\n\n\
*Tips for better results:*\n\
\u{2022} Be specific and descriptive\n\
\u{2022} Keep prompts clear and concise\n\
\u{2022} Examples: \"a cat playing piano\", \"fireworks in the sky\"\n\n\
*Need more help?* Just send me a message!";

/// Interstitial edit between the two stages of the two-step protocol.
pub const DOWNLOADING_NOTICE: &str = "\u{23f3} Video generated! Downloading...";

/// Placeholder text shown while a turn is in flight.
#[must_use]
pub fn placeholder_text(profile: &VariantProfile) -> &'static str {
    match profile.mode {
        VariantMode::Generate => {
            "\u{23f3} Generating your video...\nThis may take 1-2 minutes, please wait!"
        }
        VariantMode::Download => "\u{23f3} Processing your link, please wait!",
    }
}

/// Hint sent when the download variant gets something that is not a link.
/// No network call is made in that case.
#[must_use]
pub fn usage_hint(profile: &VariantProfile) -> &'static str {
    match profile.mode {
        VariantMode::Generate => "Please send a text prompt describing the video you want.",
        VariantMode::Download => {
            "Please send a link starting with http:// or https://, for example:\n\
             https://www.instagram.com/reel/ABC123/"
        }
    }
}

/// Caption attached to delivered media.
#[must_use]
pub fn caption(profile: &VariantProfile, kind: MediaKind, user_text: &str) -> String {
    match (profile.mode, kind) {
        (VariantMode::Generate, MediaKind::Video) => {
            format!("\u{1f3ac} Generated video for: \"{user_text}\"")
        }
        (VariantMode::Generate, MediaKind::Photo) => {
            format!("\u{1f5bc} Generated image for: \"{user_text}\"")
        }
        (VariantMode::Download, MediaKind::Video) => {
            format!("\u{1f3ac} Downloaded video from: {user_text}")
        }
        (VariantMode::Download, MediaKind::Photo) => {
            format!("\u{1f5bc} Downloaded photo from: {user_text}")
        }
    }
}

/// User-visible description of a failed turn, one message per category.
#[must_use]
pub fn failure_text(error: &TurnError) -> String {
    match error {
        TurnError::Validation => {
            "\u{274c} That doesn't look like a link. Send an http(s) URL.".to_string()
        }
        TurnError::UpstreamStatus { status } => format!(
            "\u{274c} API request failed with status: {status}\n\nPlease try again later."
        ),
        TurnError::UpstreamFormat => "\u{274c} Invalid JSON response from API.".to_string(),
        TurnError::UpstreamReported(message) => format!(
            "\u{274c} API Error: {message}\n\nPlease try again with a different prompt."
        ),
        TurnError::UpstreamTimeout => {
            "\u{23f0} Request timed out. Video generation takes time.\n\nPlease try again."
                .to_string()
        }
        TurnError::Connection(_) => {
            "\u{274c} Could not reach the video service.\n\nPlease try again later.".to_string()
        }
        TurnError::MediaFetch(_) => {
            "\u{274c} The video was generated but could not be downloaded.\n\nPlease try again."
                .to_string()
        }
        TurnError::MediaDelivery(detail) => {
            format!("\u{274c} Failed to send video: {}", truncate(detail, 100))
        }
        TurnError::Unrecognized {
            content_type,
            size,
            keys,
        } => {
            if keys.is_empty() {
                format!(
                    "\u{274c} Unexpected response format.\n\nContent-Type: {content_type}\nSize: {size} bytes"
                )
            } else {
                format!(
                    "\u{274c} No video ID or URL in API response.\n\nFields seen: {}",
                    keys.join(", ")
                )
            }
        }
        TurnError::Internal(detail) => format!(
            "\u{274c} An error occurred: {}\n\nPlease try again.",
            truncate(detail, 100)
        ),
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
