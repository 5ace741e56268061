//! NationStates API client runtime
//!
//! A rate-limited, strictly serialized client for the NationStates HTTP+XML
//! API, with typed entity handles, lazy pagination, two-phase private
//! commands, and streaming access to the daily data dumps.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        // Test that our constants are accessible
        assert_eq!(DEFAULT_LIMIT, 50);
        assert_eq!(HAPPENINGS_LIMIT, 100);
        assert_eq!(env::USER_AGENT, "NSAPI_USER_AGENT");
        assert!(API_BASE_URL.ends_with("/cgi-bin/api.cgi"));
    }

    #[test]
    fn test_error_types() {
        // Test that our error types work correctly
        let app_error = AppError::from(errors::ApiError::MissingCredentials);

        assert_eq!(app_error.category(), "authentication");
        assert!(!app_error.is_item_error());
    }
}
