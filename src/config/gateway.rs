//! Gateway connection configuration
//!
//! Everything needed to address the gateway: credentials, endpoint
//! overrides, custom headers, timeouts, and the retry budget forwarded to
//! the gateway with each request.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Timeout configuration for gateway and proxy requests
///
/// - **Connection timeout**: time allowed to establish a connection
/// - **Request timeout**: time allowed for a complete request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in seconds. Default: 30 seconds
    #[serde(default = "TimeoutConfig::default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// End-to-end request timeout in seconds. Default: 60 seconds
    #[serde(default = "TimeoutConfig::default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl TimeoutConfig {
    const fn default_connection_timeout() -> u64 {
        30
    }

    const fn default_request_timeout() -> u64 {
        60
    }

    /// Create a new timeout configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Relaxed timeouts for slow endpoints or large documents
    ///
    /// - Connection: 60 seconds
    /// - Request: 300 seconds
    pub fn relaxed() -> Self {
        Self {
            connection_timeout_secs: 60,
            request_timeout_secs: 300,
        }
    }

    /// Set connection timeout in seconds
    pub fn with_connection_timeout_secs(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    /// Set request timeout in seconds
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Get connection timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate timeout configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.connection_timeout_secs == 0 {
            return Err("Connection timeout must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.request_timeout_secs < self.connection_timeout_secs {
            return Err(
                "Request timeout must be greater than or equal to connection timeout".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connection_timeout_secs: Self::default_connection_timeout(),
            request_timeout_secs: Self::default_request_timeout(),
        }
    }
}

/// Connection settings forwarded to the gateway with each request.
///
/// The gateway resolves which upstream provider serves a model, so the
/// config is provider-agnostic: credentials and endpoint overrides are
/// passed through as-is, and `custom_provider` can pin the routing when a
/// model name alone is ambiguous.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API key for the upstream provider
    pub api_key: Option<String>,
    /// Base URL override for the API endpoint
    pub api_base: Option<String>,
    /// API version (e.g. for Azure)
    pub api_version: Option<String>,
    /// Organization ID (e.g. for OpenAI)
    pub organization: Option<String>,
    /// Override the gateway's provider routing
    pub custom_provider: Option<String>,
    /// Custom HTTP headers to include in requests
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Timeout configuration
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Retry budget forwarded to the gateway (the gateway owns the loop)
    pub max_retries: Option<u32>,
}

impl GatewayConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the API version
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Set the organization ID
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Pin the gateway's provider routing
    pub fn with_custom_provider(mut self, provider: impl Into<String>) -> Self {
        self.custom_provider = Some(provider.into());
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the timeout configuration
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the retry budget forwarded to the gateway
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Resolve the API key: explicit configuration wins, then the given
    /// environment variable.
    pub fn resolve_api_key(&self, env_var: &str) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(env_var).ok().filter(|v| !v.is_empty()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> BridgeResult<()> {
        self.timeouts.validate().map_err(BridgeError::config)?;

        if let Some(base) = &self.api_base {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(BridgeError::config(format!(
                    "api_base must start with http:// or https://, got: {base}"
                )));
            }
        }

        Ok(())
    }
}
