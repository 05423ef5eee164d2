//! Configuration for the ImageFeed client.
//!
//! Configuration can be built in code or loaded from a TOML file
//! (default: `imagefeed.toml`). Everything except `access_key` has a default.

use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ClientError;

/// Client configuration: application credentials and API endpoints.
#[derive(Clone, Deserialize)]
pub struct FeedConfig {
    /// Application access key (OAuth `client_id`, also used for anonymous reads).
    pub access_key: String,
    /// Application secret key (OAuth `client_secret`).
    #[serde(default)]
    pub secret_key: String,
    /// Redirect URI registered for the application.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Space-separated scopes requested on authorization.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Base URL of the REST API (default: https://api.unsplash.com).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// OAuth authorization page (default: https://unsplash.com/oauth/authorize).
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    /// OAuth token endpoint (default: https://unsplash.com/oauth/token).
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Photos per page (default: 10).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Timeout applied by the HTTP adapter, in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Default value functions
fn default_redirect_uri() -> String {
    "urn:ietf:wg:oauth:2.0:oob".to_string()
}

fn default_scope() -> String {
    "public read_user write_likes".to_string()
}

fn default_api_base_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_authorize_url() -> String {
    "https://unsplash.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://unsplash.com/oauth/token".to_string()
}

fn default_per_page() -> u32 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl FeedConfig {
    /// Create a configuration with default endpoints.
    pub fn new(access_key: &str, secret_key: &str, redirect_uri: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scope: default_scope(),
            api_base_url: default_api_base_url(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            per_page: default_per_page(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Set the API base URL.
    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.to_string();
        self
    }

    /// Set the OAuth token endpoint.
    pub fn with_token_url(mut self, url: &str) -> Self {
        self.token_url = url.to_string();
        self
    }

    /// Set the page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the HTTP timeout, rounded up to whole seconds.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        let partial = u64::from(timeout.subsec_nanos() > 0);
        self.request_timeout_secs = timeout.as_secs().saturating_add(partial);
        self
    }

    /// HTTP timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// [`validate`](Self::validate).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and endpoint URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_key.trim().is_empty() {
            return Err(ConfigError::Invalid("access_key must not be empty".into()));
        }
        if self.per_page == 0 {
            return Err(ConfigError::Invalid("per_page must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
        ] {
            Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{field}: {e}")))?;
        }
        Ok(())
    }

    /// `GET /photos?page=..&per_page=..`
    pub fn photos_url(&self, page: u32, per_page: u32) -> Result<Url, ClientError> {
        let mut url = self.api_url(&["photos"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());
        Ok(url)
    }

    /// `/photos/{id}/like`
    pub fn like_url(&self, photo_id: &str) -> Result<Url, ClientError> {
        self.api_url(&["photos", photo_id, "like"])
    }

    /// Token endpoint with the five `authorization_code` grant parameters.
    pub fn token_request_url(&self, code: &str) -> Result<Url, ClientError> {
        let mut url = parse_url(&self.token_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.access_key)
            .append_pair("client_secret", &self.secret_key)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("code", code)
            .append_pair("grant_type", "authorization_code");
        Ok(url)
    }

    /// Page the user visits to grant access and obtain a code.
    pub fn authorization_url(&self) -> Result<Url, ClientError> {
        let mut url = parse_url(&self.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.access_key)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scope);
        Ok(url)
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = parse_url(&self.api_base_url)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base", self.api_base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("api_base_url", &self.api_base_url)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("per_page", &self.per_page)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn parse_url(value: &str) -> Result<Url, ClientError> {
    Url::parse(value).map_err(|e| ClientError::InvalidUrl(format!("{value}: {e}")))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Configuration values are inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}
