//! Input validation for the download variant.

use regex::Regex;
use std::sync::OnceLock;

static URL_SHAPE: OnceLock<Regex> = OnceLock::new();

/// Whether the input looks like a single http(s) URL.
///
/// Shape check only: scheme followed by a non-empty run of non-whitespace
/// characters. The upstream decides whether it can actually handle the link.
#[must_use]
pub fn is_valid_url(text: &str) -> bool {
    let re = URL_SHAPE
        .get_or_init(|| Regex::new(r"^https?://\S+$").expect("url shape pattern is valid"));
    re.is_match(text.trim())
}
