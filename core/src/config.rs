//! Client configuration loaded from JSON.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::http::Params;

/// Settings for building a `Client`.
///
/// ```json
/// {
///   "base_url": "https://rickandmortyapi.com",
///   "default_headers": { "User-Agent": "restkit" },
///   "timeout_secs": 10
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub default_headers: Params,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: Params::new(),
            timeout_secs: None,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| ApiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The base URL must parse and name a host.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Config(format!("base_url '{}': {e}", self.base_url)))?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ApiError::Config(format!("base_url '{}' has no host", self.base_url)));
        }
        Ok(())
    }
}

#[cfg(feature = "reqwest")]
impl crate::client::Client {
    /// Client backed by a `ReqwestTransport` honoring the configured timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let transport = crate::transport::ReqwestTransport::with_timeout(config.timeout())
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self::new(config.base_url.clone(), std::sync::Arc::new(transport))
            .with_default_headers(config.default_headers.clone()))
    }
}
