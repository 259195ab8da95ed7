//! Client configuration.
//!
//! The configuration is built once and handed to [`JobClient::new`](crate::JobClient::new);
//! the client never reads the process environment on its own.

use std::sync::Arc;
use std::time::Duration;

use crate::backoff::RetryPolicy;
use crate::error::{Error, Result};

/// Default Runpod serverless API base URL.
pub const RUNPOD_API_BASE_URL: &str = "https://api.runpod.ai/v2";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of consecutive unrecognized statuses tolerated while polling.
pub const DEFAULT_MAX_UNKNOWN_STATUSES: u32 = 3;

const MIN_API_KEY_LEN: usize = 10;

/// Immutable settings for a [`JobClient`](crate::JobClient).
#[derive(Clone)]
pub struct ClientConfig {
    api_key: Arc<str>,
    base_url: Arc<str>,
    request_timeout: Duration,
    retry: RetryPolicy,
    max_unknown_statuses: u32,
    user_agent: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .field("max_unknown_statuses", &self.max_unknown_statuses)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a configuration with the given API key and defaults elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the key is too short.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// The bearer credential.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout applied to each HTTP request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Retry policy for individual status fetches.
    #[must_use]
    pub const fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Consecutive unrecognized statuses tolerated before giving up.
    #[must_use]
    pub const fn max_unknown_statuses(&self) -> u32 {
        self.max_unknown_statuses
    }

    /// Optional `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Build a reqwest client with this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.request_timeout);

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    max_unknown_statuses: Option<u32>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom base URL, e.g. a proxy or a test server.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the transport retry policy used while polling.
    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Set how many unrecognized statuses in a row are tolerated.
    #[must_use]
    pub const fn max_unknown_statuses(mut self, max: u32) -> Self {
        self.max_unknown_statuses = Some(max);
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is missing or shorter than ten
    /// characters, or if the retry policy allows zero attempts.
    pub fn build(self) -> Result<ClientConfig> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| k.len() >= MIN_API_KEY_LEN)
            .ok_or_else(|| Error::config("API key is missing or too short"))?;

        let retry = self.retry.unwrap_or_default();
        if retry.max_attempts == 0 {
            return Err(Error::config("retry policy needs at least one attempt"));
        }

        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or(RUNPOD_API_BASE_URL)
            .trim_end_matches('/');

        Ok(ClientConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            retry,
            max_unknown_statuses: self
                .max_unknown_statuses
                .unwrap_or(DEFAULT_MAX_UNKNOWN_STATUSES),
            user_agent: self.user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("rp_0123456789").unwrap();
        assert_eq!(config.base_url(), RUNPOD_API_BASE_URL);
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.retry(), RetryPolicy::default());
        assert_eq!(config.max_unknown_statuses(), 3);
        assert!(config.user_agent().is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::builder()
            .api_key("  rp_0123456789  ")
            .base_url("http://127.0.0.1:9000/v2/")
            .request_timeout(Duration::from_secs(5))
            .max_unknown_statuses(1)
            .user_agent("pixjob-test")
            .build()
            .unwrap();

        assert_eq!(config.api_key(), "rp_0123456789");
        assert_eq!(config.base_url(), "http://127.0.0.1:9000/v2");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_unknown_statuses(), 1);
        assert_eq!(config.user_agent(), Some("pixjob-test"));
    }

    #[test]
    fn test_rejects_short_key() {
        assert!(matches!(ClientConfig::new("short"), Err(Error::Config(_))));
        assert!(matches!(
            ClientConfig::builder().build(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let result = ClientConfig::builder()
            .api_key("rp_0123456789")
            .retry(RetryPolicy {
                max_attempts: 0,
                delay: Duration::ZERO,
            })
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("rp_secret_key_value").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("rp_secret_key_value"));
        assert!(debug.contains("[REDACTED]"));
    }
}
