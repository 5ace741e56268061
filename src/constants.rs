//! Application constants for the NationStates client
//!
//! This module centralizes all constants used throughout the crate,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names read by the command-line tool
pub mod env {
    /// User agent identifying the caller to the API
    pub const USER_AGENT: &str = "NSAPI_USER_AGENT";

    /// Nation password used to bootstrap an authenticated session
    pub const PASSWORD: &str = "NSAPI_PASSWORD";

    /// Previously issued autologin credential
    pub const AUTOLOGIN: &str = "NSAPI_AUTOLOGIN";
}

/// Request and response header names used by the API
pub mod headers {
    /// Password credential header
    pub const PASSWORD: &str = "X-Password";

    /// Autologin credential header (request and response)
    pub const AUTOLOGIN: &str = "X-Autologin";

    /// Session pin header (request and response)
    pub const PIN: &str = "X-Pin";

    /// Server-reported count of requests seen in the current window
    pub const RATELIMIT_SEEN: &str = "X-Ratelimit-Requests-Seen";
}

/// API endpoints and query parameter names
pub mod api {
    /// API endpoint all shard requests are sent to
    pub const BASE_URL: &str = "https://www.nationstates.net/cgi-bin/api.cgi";

    /// Location of the current daily dumps and static card lists
    pub const DUMP_BASE_URL: &str = "https://www.nationstates.net/pages";

    /// Location of archived daily dumps
    pub const ARCHIVE_BASE_URL: &str = "https://www.nationstates.net/archive";

    /// Shard list parameter
    pub const SHARD_PARAM: &str = "q";

    /// Separator between shard names in the shard list
    pub const SHARD_SEPARATOR: &str = "+";

    /// Cursor parameter for event streams
    pub const BEFORE_ID: &str = "beforeid";

    /// Cursor parameter for trade streams
    pub const BEFORE_TIME: &str = "beforetime";
}

/// Server-side pagination caps
pub mod pages {
    /// Maximum events returned by one happenings request
    pub const HAPPENINGS_LIMIT: usize = 100;

    /// Maximum trades returned by one card trades request
    pub const TRADES_LIMIT: usize = 50;
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Rate limiting configuration
pub mod limits {
    use super::Duration;

    /// Requests allowed per server window before a lockout
    pub const DEFAULT_LIMIT: u32 = 50;

    /// Penalty window applied once the limit is reached
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(35);

    /// Minimum spacing between consecutive requests
    pub const DEFAULT_SPACING: Duration = Duration::from_millis(600);
}

/// Data dump constants
pub mod dumps {
    /// Hour (UTC) at which the daily dumps are regenerated
    pub const GENERATION_HOUR_UTC: u32 = 6;

    /// Hour (UTC) after which the previous day's dump is considered published
    pub const PUBLISH_HOUR_UTC: u32 = 7;

    /// Default marker store file name
    pub const MARKER_FILE_NAME: &str = "marker.json";

    /// Nations dump resource name
    pub const NATIONS: &str = "nations";

    /// Regions dump resource name
    pub const REGIONS: &str = "regions";

    /// Record tag of the nations dump
    pub const NATION_TAG: &str = "NATION";

    /// Record tag of the regions dump
    pub const REGION_TAG: &str = "REGION";

    /// Record tag of the card lists
    pub const CARD_TAG: &str = "CARD";
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Default configuration file name in the working directory
    pub const CONFIG_FILE_NAME: &str = "nsapi.toml";

    /// Application directory name under the user config/cache dirs
    pub const APP_DIR_NAME: &str = "nsapi";
}

// Re-export commonly used constants for convenience
pub use api::BASE_URL as API_BASE_URL;
pub use limits::{DEFAULT_COOLDOWN, DEFAULT_LIMIT, DEFAULT_SPACING};
pub use pages::{HAPPENINGS_LIMIT, TRADES_LIMIT};
