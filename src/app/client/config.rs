//! HTTP client configuration and building logic
//!
//! Holds the endpoints, timeouts and rate-limit settings of one client
//! instance and builds the underlying `reqwest` client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::rate_limit::RateLimitConfig;
use crate::constants::{api, http};
use crate::errors::{ApiError, ApiResult};

/// Configuration of one API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Identifies the caller to the API; required by the server
    pub user_agent: String,
    /// Shard request endpoint
    pub api_url: String,
    /// Location of current dumps and card lists
    pub dump_url: String,
    /// Location of archived dumps
    pub archive_url: String,
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Server-count throttling
    pub rate_limit: RateLimitConfig,
}

impl ClientConfig {
    /// Default configuration with the given user agent
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            api_url: api::BASE_URL.to_string(),
            dump_url: api::DUMP_BASE_URL.to_string(),
            archive_url: api::ARCHIVE_BASE_URL.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Point every endpoint at one base, as used against a mock server
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.api_url = format!("{base}/cgi-bin/api.cgi");
        self.dump_url = format!("{base}/pages");
        self.archive_url = format!("{base}/archive");
        self
    }

    /// Check the settings that the server or the client cannot work without
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` for an unparseable endpoint and
    /// `ApiError::InvalidHeader` for an empty user agent
    pub fn validate(&self) -> ApiResult<()> {
        if self.user_agent.trim().is_empty() {
            return Err(ApiError::InvalidHeader {
                name: "User-Agent".to_string(),
            });
        }
        self.api_url()?;
        self.dump_url()?;
        self.archive_url()?;
        Ok(())
    }

    pub fn api_url(&self) -> ApiResult<Url> {
        parse_url(&self.api_url)
    }

    pub fn dump_url(&self) -> ApiResult<Url> {
        parse_url(&self.dump_url)
    }

    pub fn archive_url(&self) -> ApiResult<Url> {
        parse_url(&self.archive_url)
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> ApiResult<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.clone())
            .tcp_nodelay(true);

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(ApiError::Http)
    }
}

pub(crate) fn parse_url(url: &str) -> ApiResult<Url> {
    Url::parse(url).map_err(|e| ApiError::InvalidUrl {
        url: url.to_string(),
        error: e.to_string(),
    })
}
