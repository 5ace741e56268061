//! Error types for the NationStates client
//!
//! Errors are grouped by the component that raises them. Every API failure
//! surfaces as a distinct, inspectable variant; nothing is retried or
//! swallowed inside the client.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Credentials were rejected (HTTP 403, or no autologin could be obtained)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// No credential was supplied when building an authenticated session
    #[error("An authenticated session needs a password or an autologin")]
    MissingCredentials,

    /// The named entity does not exist server-side (HTTP 404)
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// The response body could not be parsed as XML
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String, payload: String },

    /// The prepare phase of a command did not return a success token
    #[error("Command '{command}' rejected: {message}")]
    CommandRejected { command: String, message: String },

    /// Any other non-success status
    #[error("API request failed with HTTP {status}: {url}")]
    Server { status: u16, url: String },

    /// Transport-level failure
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// A request URL could not be built
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// A header value contains characters HTTP does not allow
    #[error("Invalid header value for {name}")]
    InvalidHeader { name: String },

    /// I/O error while writing a download
    #[error("File I/O error")]
    Io(#[from] std::io::Error),

    /// Atomic rename of a finished download failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },
}

impl ApiError {
    /// Build an authentication failure with a message
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Whether a batch caller should skip this item and continue
    pub fn is_item_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotFound { .. })
    }
}

/// Errors raised while decoding XML documents and records
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Syntax error reported by the XML reader
    #[error("XML syntax error at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    /// I/O error, including a corrupt or truncated gzip stream
    #[error("I/O error while decoding")]
    Io(#[from] std::io::Error),

    /// The document ended while elements were still open
    #[error("Document truncated with {open} unclosed element(s), innermost <{tag}>")]
    Truncated { open: usize, tag: String },

    /// The document has no root element
    #[error("Document contains no root element")]
    Empty,

    /// A required child element is absent
    #[error("Element <{parent}> is missing <{field}>")]
    MissingField { parent: String, field: String },

    /// A field could not be converted to its typed value
    #[error("Invalid value for <{field}>: '{value}'")]
    InvalidValue { field: String, value: String },
}

/// Errors raised by the resource and dump managers
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Marker store could not be read or written
    #[error("Marker store I/O error: {path}")]
    MarkerIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Marker store could not be serialized
    #[error("Marker store serialization failed")]
    MarkerJson(#[from] serde_json::Error),

    /// Download of the resource failed
    #[error("Failed to download resource '{name}'")]
    Download {
        name: String,
        #[source]
        source: ApiError,
    },

    /// Local resource file could not be opened
    #[error("Cannot open resource file: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoding the resource failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Unknown dump or card season
    #[error("Unknown resource: {name}")]
    Unknown { name: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// No user configuration directory on this platform
    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Decode error
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Resource error
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Whether a batch caller should skip this item and continue
    pub fn is_item_error(&self) -> bool {
        matches!(self, AppError::Api(e) if e.is_item_error())
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Api(ApiError::Authentication { .. } | ApiError::MissingCredentials) => {
                "authentication"
            }
            AppError::Api(ApiError::NotFound { .. }) => "not_found",
            AppError::Api(ApiError::MalformedResponse { .. }) => "malformed_response",
            AppError::Api(ApiError::CommandRejected { .. }) => "command_rejected",
            AppError::Api(_) => "api",
            AppError::Decode(_) => "decode",
            AppError::Resource(_) => "resource",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Decode result type alias
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Resource result type alias
pub type ResourceResult<T> = std::result::Result<T, ResourceError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<DecodeError> for ApiError {
    fn from(error: DecodeError) -> Self {
        ApiError::MalformedResponse {
            reason: error.to_string(),
            payload: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_errors_are_skippable() {
        assert!(ApiError::authentication("bad password").is_item_error());
        assert!(ApiError::NotFound {
            url: "https://example.com".to_string()
        }
        .is_item_error());
        assert!(!ApiError::Server {
            status: 500,
            url: "https://example.com".to_string()
        }
        .is_item_error());
    }

    #[test]
    fn test_error_categories() {
        let err = AppError::from(ApiError::CommandRejected {
            command: "giftcard".to_string(),
            message: "no".to_string(),
        });
        assert_eq!(err.category(), "command_rejected");
        assert!(!err.is_item_error());

        let err = AppError::from(ApiError::NotFound {
            url: "u".to_string(),
        });
        assert_eq!(err.category(), "not_found");
        assert!(err.is_item_error());
    }
}
