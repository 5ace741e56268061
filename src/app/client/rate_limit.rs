//! Server-driven request throttling
//!
//! The API reports how many requests it has seen from this client in the
//! current window. The limiter turns that count into a deadline before which
//! the next request may not be sent: a long cooldown once the limit is
//! reached, and a short spacing otherwise.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn, Span};

use crate::constants::{headers, limits};

/// Rate limit settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests per server window before the cooldown applies
    pub limit: u32,
    /// Lockout applied once the limit is reached
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
    /// Delay applied after every request below the limit
    #[serde(with = "humantime_serde")]
    pub spacing: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: limits::DEFAULT_LIMIT,
            cooldown: limits::DEFAULT_COOLDOWN,
            spacing: limits::DEFAULT_SPACING,
        }
    }
}

/// Tracks the server-reported request count and the resulting lock deadline
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    lock_until: Instant,
    last_count: u32,
    span: Span,
}

impl RateLimiter {
    /// Create a limiter that allows the first request immediately
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            lock_until: Instant::now(),
            last_count: 0,
            span: tracing::debug_span!("rate_limiter"),
        }
    }

    /// Attach a span that parents this limiter's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Deadline before which no request may be sent
    pub fn lock_until(&self) -> Instant {
        self.lock_until
    }

    /// Most recent count reported by the server
    pub fn last_count(&self) -> u32 {
        self.last_count
    }

    /// Record the server's count and recompute the lock deadline
    ///
    /// A missing count keeps the last known one, so a response without the
    /// header never relaxes the limiter.
    pub fn update(&mut self, observed: Option<u32>) {
        if let Some(count) = observed {
            self.last_count = count;
        }

        let now = Instant::now();
        let window = if self.last_count >= self.config.limit {
            warn!(
                parent: &self.span,
                "Server has seen {} requests (limit {}), cooling down for {:?}",
                self.last_count,
                self.config.limit,
                self.config.cooldown
            );
            self.config.cooldown
        } else {
            self.config.spacing
        };
        self.lock_until = now + window;
    }

    /// Sleep until the lock deadline has passed
    pub async fn wait(&self) {
        let deadline = self.lock_until;
        let now = Instant::now();
        if deadline > now {
            debug!(parent: &self.span, "Rate limited, waiting {:?}", deadline - now);
            sleep_until(deadline).await;
        }
    }

    /// Read the request counter from response headers
    pub fn observed_count(response_headers: &HeaderMap) -> Option<u32> {
        response_headers
            .get(headers::RATELIMIT_SEEN)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    }
}
