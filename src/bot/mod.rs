/// Command and message handlers
pub mod handlers;
/// Placeholder message lifecycle
pub mod placeholder;
/// User-facing message templates
pub mod texts;
