//! Core HTTP operations with server-driven rate limiting
//!
//! Every request goes through [`HttpHandler::get_response`]: headers are
//! merged, the rate limiter is awaited, the request is sent, and the limiter
//! and auth session are updated from the response before its status is
//! checked. Nothing is retried.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn, Span};
use url::Url;

use super::auth::AuthSession;
use super::rate_limit::RateLimiter;
use crate::app::xml::XmlElement;
use crate::errors::{ApiError, ApiResult};

/// A successful response with its body read
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as an XML document
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MalformedResponse` carrying the body when it is not XML
    pub fn xml(&self) -> ApiResult<XmlElement> {
        XmlElement::parse(self.body.as_bytes()).map_err(|e| ApiError::MalformedResponse {
            reason: e.to_string(),
            payload: self.body.clone(),
        })
    }
}

/// Sends single requests through the rate limiter
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter,
    user_agent: String,
    span: Span,
}

impl HttpHandler {
    /// Creates a new HttpHandler
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use for requests
    /// * `rate_limiter` - Limiter every request waits on
    /// * `user_agent` - Sent with every request, ahead of auth and caller headers
    pub fn new(client: Client, rate_limiter: RateLimiter, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            rate_limiter,
            user_agent: user_agent.into(),
            span: tracing::debug_span!("transport"),
        }
    }

    /// Attach a span that parents this handler's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Merge user agent, auth headers and caller headers, later entries winning
    fn merged_headers(
        &self,
        session: Option<&AuthSession>,
        caller: &[(String, String)],
    ) -> ApiResult<HeaderMap> {
        let mut merged = HeaderMap::new();
        merged.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &self.user_agent)?);

        if let Some(session) = session {
            for (name, value) in session.headers() {
                merged.insert(header_name(name)?, header_value(name, value)?);
            }
        }

        for (name, value) in caller {
            merged.insert(header_name(name)?, header_value(name, value)?);
        }
        Ok(merged)
    }

    /// Fetches the raw response, waiting on the rate limiter first
    ///
    /// Use `get()` if you need the body as text.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `headers` - Caller headers, overriding defaults on conflict
    /// * `session` - Auth session to send and update, if any
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for 404, `ApiError::Authentication` for 403
    /// and `ApiError::Server` for any other non-success status
    pub async fn get_response(
        &mut self,
        url: &Url,
        headers: &[(String, String)],
        mut session: Option<&mut AuthSession>,
    ) -> ApiResult<Response> {
        let merged = self.merged_headers(session.as_deref(), headers)?;

        self.rate_limiter.wait().await;
        debug!(parent: &self.span, "GET {}", url);
        let sent = self.client.get(url.as_str()).headers(merged).send().await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                // Keep spacing requests even when nothing came back
                self.rate_limiter.update(None);
                warn!(parent: &self.span, "Request to {} failed: {}", url, e);
                return Err(ApiError::Http(e));
            }
        };

        self.rate_limiter
            .update(RateLimiter::observed_count(response.headers()));
        if let Some(session) = session.as_deref_mut() {
            session.update(response.headers());
        }

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        warn!(parent: &self.span, "HTTP {} from {}", status.as_u16(), url);
        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound {
                url: url.to_string(),
            },
            StatusCode::FORBIDDEN => ApiError::authentication(format!("HTTP 403 from {url}")),
            _ => ApiError::Server {
                status: status.as_u16(),
                url: url.to_string(),
            },
        })
    }

    /// Fetches a response and reads its body
    ///
    /// # Errors
    ///
    /// Same as `get_response()`, plus transport errors while reading the body
    pub async fn get(
        &mut self,
        url: &Url,
        headers: &[(String, String)],
        session: Option<&mut AuthSession>,
    ) -> ApiResult<ApiResponse> {
        let response = self.get_response(url, headers, session).await?;
        let status = response.status();
        let response_headers = response.headers().clone();
        let body = response.text().await?;

        Ok(ApiResponse {
            url: url.clone(),
            status,
            headers: response_headers,
            body,
        })
    }
}

fn header_name(name: &str) -> ApiResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ApiError::InvalidHeader {
        name: name.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader {
        name: name.to_string(),
    })
}
