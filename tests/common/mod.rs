//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::io::Write;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use nsapi::app::{ClientConfig, NsClient, RateLimitConfig};
use wiremock::MockServer;

/// API path every shard request goes to on the mock server
pub const API_PATH: &str = "/cgi-bin/api.cgi";

/// Client settings pointed at the mock server, without request spacing
pub fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        rate_limit: RateLimitConfig {
            spacing: Duration::ZERO,
            ..RateLimitConfig::default()
        },
        ..ClientConfig::new("nsapi integration tests").with_base_url(&server.uri())
    }
}

pub fn test_client(server: &MockServer) -> NsClient {
    NsClient::new(test_config(server)).unwrap()
}

/// Gzip-compress a document
pub fn gzip(document: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(document.as_bytes()).unwrap();
    encoder.finish().unwrap()
}
