//! Configuration and settings management
//!
//! Loads settings from environment variables and resolves the per-deployment
//! variant profile (which upstream endpoint the bot talks to and how).

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstream host the original deployments point at.
pub const DEFAULT_API_BASE_URL: &str = "https://texttovideoapi.anshapi.workers.dev";

/// Client-identification header sent on every upstream request.
/// The upstream rejects default library user agents.
pub const SPOOFED_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Deployment variant: `generate` (text prompt) or `download` (URL input)
    pub bot_variant: Option<String>,

    /// Upstream base URL override
    pub api_base_url: Option<String>,
    /// Path of the first-stage endpoint
    pub generate_path: Option<String>,
    /// Path of the companion endpoint used by the two-step protocol
    pub companion_path: Option<String>,
    /// Query parameter the user input is encoded into
    pub query_param: Option<String>,
    /// Timeout for the first-stage request, in seconds
    pub request_timeout_secs: Option<u64>,
    /// Timeout for media fetches (companion endpoint or referenced URL)
    pub fetch_timeout_secs: Option<u64>,
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case;
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }

    /// Resolve the deployment variant profile from these settings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `bot_variant` names an unknown variant.
    pub fn variant_profile(&self) -> Result<VariantProfile, ConfigError> {
        let mode = match self.bot_variant.as_deref() {
            None | Some("generate") => VariantMode::Generate,
            Some("download") => VariantMode::Download,
            Some(other) => {
                return Err(ConfigError::Message(format!(
                    "unknown BOT_VARIANT '{other}' (expected 'generate' or 'download')"
                )))
            }
        };

        let mut profile = VariantProfile::defaults_for(mode);

        if let Some(base) = &self.api_base_url {
            profile.base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(path) = &self.generate_path {
            profile.generate_path.clone_from(path);
        }
        if let Some(path) = &self.companion_path {
            profile.companion_path = Some(path.clone());
        }
        if let Some(param) = &self.query_param {
            profile.query_param.clone_from(param);
        }
        if let Some(secs) = self.request_timeout_secs {
            profile.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.fetch_timeout_secs {
            profile.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(profile)
    }
}

/// Which of the collapsed bot variants this deployment runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantMode {
    /// Free-text prompt is relayed to a media-generation endpoint
    Generate,
    /// User sends a link; it must pass URL-shape validation first
    Download,
}

/// Per-deployment configuration that distinguishes the bot variants.
///
/// The original deployments were four near-identical scripts; everything that
/// differed between them lives here.
#[derive(Debug, Clone)]
pub struct VariantProfile {
    /// Variant behavior switch
    pub mode: VariantMode,
    /// Upstream base URL, no trailing slash
    pub base_url: String,
    /// First-stage endpoint path
    pub generate_path: String,
    /// Companion endpoint path for the two-step protocol; `None` disables it
    pub companion_path: Option<String>,
    /// Query parameter carrying the percent-encoded user input
    pub query_param: String,
    /// First-stage request timeout
    pub request_timeout: Duration,
    /// Media fetch timeout (companion endpoint and referenced URLs)
    pub fetch_timeout: Duration,
}

impl VariantProfile {
    /// Built-in defaults for a variant, mirroring the original deployments.
    #[must_use]
    pub fn defaults_for(mode: VariantMode) -> Self {
        match mode {
            VariantMode::Generate => Self {
                mode,
                base_url: DEFAULT_API_BASE_URL.to_string(),
                generate_path: "/generate".to_string(),
                companion_path: Some("/video".to_string()),
                query_param: "prompt".to_string(),
                request_timeout: Duration::from_secs(150),
                fetch_timeout: Duration::from_secs(120),
            },
            VariantMode::Download => Self {
                mode,
                base_url: DEFAULT_API_BASE_URL.to_string(),
                generate_path: "/download".to_string(),
                companion_path: None,
                query_param: "url".to_string(),
                request_timeout: Duration::from_secs(120),
                fetch_timeout: Duration::from_secs(120),
            },
        }
    }

    /// Full URL of the first-stage endpoint
    #[must_use]
    pub fn generate_url(&self) -> String {
        format!("{}{}", self.base_url, self.generate_path)
    }

    /// Full URL of the companion endpoint, if this variant has one
    #[must_use]
    pub fn companion_url(&self) -> Option<String> {
        self.companion_path
            .as_ref()
            .map(|path| format!("{}{}", self.base_url, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_token() -> Settings {
        Settings {
            telegram_token: "dummy".to_string(),
            bot_variant: None,
            api_base_url: None,
            generate_path: None,
            companion_path: None,
            query_param: None,
            request_timeout_secs: None,
            fetch_timeout_secs: None,
        }
    }

    #[test]
    fn test_generate_defaults() -> Result<(), ConfigError> {
        let profile = settings_with_token().variant_profile()?;
        assert_eq!(profile.mode, VariantMode::Generate);
        assert_eq!(
            profile.generate_url(),
            format!("{DEFAULT_API_BASE_URL}/generate")
        );
        assert_eq!(
            profile.companion_url(),
            Some(format!("{DEFAULT_API_BASE_URL}/video"))
        );
        assert_eq!(profile.query_param, "prompt");
        assert_eq!(profile.request_timeout, Duration::from_secs(150));
        Ok(())
    }

    #[test]
    fn test_download_variant_overrides() -> Result<(), ConfigError> {
        let mut settings = settings_with_token();
        settings.bot_variant = Some("download".to_string());
        settings.api_base_url = Some("https://dl.example.com/".to_string());
        settings.request_timeout_secs = Some(30);

        let profile = settings.variant_profile()?;
        assert_eq!(profile.mode, VariantMode::Download);
        // trailing slash on the override must not double up
        assert_eq!(profile.generate_url(), "https://dl.example.com/download");
        assert_eq!(profile.companion_url(), None);
        assert_eq!(profile.query_param, "url");
        assert_eq!(profile.request_timeout, Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let mut settings = settings_with_token();
        settings.bot_variant = Some("remix".to_string());
        assert!(settings.variant_profile().is_err());
    }
}
