//! HTTP client for the NationStates API
//!
//! The module is organized into specialized components:
//! - `config`: client configuration and building
//! - `rate_limit`: server-count driven throttling
//! - `auth`: per-nation credential state
//! - `http`: single requests with header merging and status mapping
//! - `download`: streamed file downloads with atomic writes

use std::path::Path;

use async_trait::async_trait;
use tracing::Span;
use url::Url;

use crate::app::query::ShardQuery;
use crate::app::resource::Downloader;
use crate::app::shards::ShardSource;
use crate::app::xml::XmlElement;
use crate::errors::ApiResult;

pub mod auth;
pub mod config;
pub mod download;
pub mod http;
pub mod rate_limit;

pub use auth::AuthSession;
pub use config::ClientConfig;
pub use http::{ApiResponse, HttpHandler};
pub use rate_limit::{RateLimitConfig, RateLimiter};

use download::DownloadHandler;

/// One client instance: a transport, its rate limiter and the API endpoints
///
/// Every request-issuing operation takes `&mut self`, so requests from one
/// instance are strictly serialized. Callers wanting concurrency run several
/// instances and coordinate their rate limits themselves.
#[derive(Debug)]
pub struct NsClient {
    http_handler: HttpHandler,
    config: ClientConfig,
    api_url: Url,
    span: Span,
}

impl NsClient {
    /// Creates a new client
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the configuration is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;
        let span = tracing::info_span!("nsapi", agent = %config.user_agent);

        let client = config.build_http_client()?;
        let rate_limiter = RateLimiter::new(config.rate_limit)
            .with_span(tracing::debug_span!(parent: &span, "rate_limiter"));
        let http_handler = HttpHandler::new(client, rate_limiter, config.user_agent.clone())
            .with_span(tracing::debug_span!(parent: &span, "transport"));
        let api_url = config.api_url()?;

        tracing::debug!(parent: &span, "Created client for {}", api_url);
        Ok(Self {
            http_handler,
            config,
            api_url,
            span,
        })
    }

    /// Replace the span that parents this client's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        self.http_handler.rate_limiter()
    }

    /// Send a shard request for an entity and return the raw response
    ///
    /// The entity adjusts the query, supplies its key parameters and, for an
    /// authenticated nation, its session.
    pub async fn fetch<S: ShardSource + ?Sized>(
        &mut self,
        source: &mut S,
        query: ShardQuery,
    ) -> ApiResult<ApiResponse> {
        let query = source.prepare(query);
        let url = query.to_url(&self.api_url, &source.key());
        self.http_handler
            .get(&url, &query.headers, source.session())
            .await
    }

    /// Send a shard request for an entity and parse the response
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MalformedResponse` if the body is not XML, besides
    /// the transport errors of `fetch()`
    pub async fn request<S: ShardSource + ?Sized>(
        &mut self,
        source: &mut S,
        query: ShardQuery,
    ) -> ApiResult<XmlElement> {
        self.fetch(source, query).await?.xml()
    }
}

#[async_trait]
impl Downloader for NsClient {
    async fn download(&mut self, source: &Url, destination: &Path) -> ApiResult<u64> {
        DownloadHandler::new(&mut self.http_handler)
            .download_file(source, destination)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;

    #[test]
    fn test_client_creation() {
        // Test that a client builds from the default configuration
        let client = NsClient::new(ClientConfig::new("nsapi unit tests"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_requires_user_agent() {
        assert!(matches!(
            NsClient::new(ClientConfig::new("")),
            Err(ApiError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_client_rejects_bad_url() {
        let config = ClientConfig {
            api_url: "not a url".to_string(),
            ..ClientConfig::new("ua")
        };
        assert!(matches!(
            NsClient::new(config),
            Err(ApiError::InvalidUrl { .. })
        ));
    }
}
