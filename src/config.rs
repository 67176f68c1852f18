use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// How the checkout approval page is meant to be presented by the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutMode {
    /// Redirect the end user to the hosted approval page (default)
    Redirect,
    /// Embed the approval page as an iframe, fetched and base64-decoded
    Iframe,
}

/// Immutable client configuration.
///
/// Supplied once at construction and read-only for the lifetime of the client.
/// Validation happens in [`ClientConfig::validate`], called by the client
/// constructors, so a broken setup fails fast instead of surfacing later as an
/// auth or transport error.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URI of the API, e.g. `https://api.preprod.slimpay.com`
    pub base_uri: String,

    /// Profile URI used in the HAL Accept header and link relations
    pub profile_uri: String,

    /// API version string appended to the Accept profile, e.g. `v1`
    pub api_version: String,

    /// OAuth2 client id
    pub app_id: String,

    /// OAuth2 client secret
    pub app_secret: String,

    /// Checkout presentation mode
    pub mode: CheckoutMode,

    /// Per-request transport timeout in seconds
    pub request_timeout: u64,
}

impl ClientConfig {
    /// Create a configuration with the default mode and timeout.
    pub fn new(
        base_uri: impl Into<String>,
        profile_uri: impl Into<String>,
        api_version: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_uri: base_uri.into(),
            profile_uri: profile_uri.into(),
            api_version: api_version.into(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            mode: CheckoutMode::Redirect,
            request_timeout: 30,
        }
    }

    /// Load configuration from `SLIMPAY_*` environment variables.
    ///
    /// Reads a `.env` file first if one exists. Optional variables:
    /// `SLIMPAY_MODE` (`redirect`/`iframe`) and `SLIMPAY_REQUEST_TIMEOUT`
    /// (seconds).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let require = |name: &'static str, var: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let config = Self {
            base_uri: require("base_uri", "SLIMPAY_BASE_URI")?,
            profile_uri: require("profile_uri", "SLIMPAY_PROFILE_URI")?,
            api_version: require("api_version", "SLIMPAY_API_VERSION")?,
            app_id: require("app_id", "SLIMPAY_APP_ID")?,
            app_secret: require("app_secret", "SLIMPAY_APP_SECRET")?,

            mode: parse_mode(&std::env::var("SLIMPAY_MODE").unwrap_or_default()),

            request_timeout: std::env::var("SLIMPAY_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_uri.is_empty() {
            return Err(ConfigError::Missing("base_uri"));
        }
        if self.profile_uri.is_empty() {
            return Err(ConfigError::Missing("profile_uri"));
        }
        if self.api_version.is_empty() {
            return Err(ConfigError::Missing("api_version"));
        }
        if self.app_id.is_empty() {
            return Err(ConfigError::Missing("app_id"));
        }
        if self.app_secret.is_empty() {
            return Err(ConfigError::Missing("app_secret"));
        }

        Url::parse(&self.base_uri).map_err(|e| ConfigError::Invalid {
            option: "base_uri",
            reason: e.to_string(),
        })?;

        if self.request_timeout == 0 {
            return Err(ConfigError::Invalid {
                option: "request_timeout",
                reason: "timeout must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Set the checkout mode.
    pub fn with_mode(mut self, mode: CheckoutMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }
}

/// Parse a checkout mode from string
fn parse_mode(s: &str) -> CheckoutMode {
    match s.to_lowercase().as_str() {
        "iframe" => CheckoutMode::Iframe,
        _ => CheckoutMode::Redirect,
    }
}
