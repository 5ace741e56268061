//! Configuration management for the NationStates client
//!
//! Settings are read from a TOML file with one section per component. Every
//! field has a default, so an empty or missing file yields a working
//! configuration apart from the user agent, which must come from the file,
//! the environment, or the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::dump::generation_time;
use crate::app::{ClientConfig, DumpConfig, RateLimitConfig};
use crate::constants::{api, dumps, files, http, limits};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Server-count throttling
    pub rate_limit: RateLimitConfig,
    /// Dump storage settings
    pub dumps: DumpConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// User agent sent with every request
    pub user_agent: Option<String>,
    /// Shard request endpoint
    pub api_url: String,
    /// Location of current dumps and card lists
    pub dump_url: String,
    /// Location of archived dumps
    pub archive_url: String,
    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Connection pool idle timeout (None = no timeout)
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            user_agent: None,
            api_url: api::BASE_URL.to_string(),
            dump_url: api::DUMP_BASE_URL.to_string(),
            archive_url: api::ARCHIVE_BASE_URL.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
        }
    }
}

/// TOML-friendly dump configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfigToml {
    /// Dump directory (None = user cache directory)
    pub directory: Option<PathBuf>,
    /// Marker store file (None = inside the dump directory)
    pub marker_file: Option<PathBuf>,
    /// Daily generation time, UTC
    pub generation_time: NaiveTime,
}

impl Default for DumpConfigToml {
    fn default() -> Self {
        Self {
            directory: None,
            marker_file: None,
            generation_time: generation_time(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
    /// Show event targets
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            show_target: false,
        }
    }
}

impl AppConfig {
    /// Load configuration, from an explicit path or the standard locations
    ///
    /// Without an explicit path the first existing file among
    /// `./nsapi.toml` and `<config dir>/nsapi/nsapi.toml` is used, and
    /// defaults apply when neither exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if an explicit path does not exist,
    /// and read or parse errors for an unreadable file
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file().await,
        };

        match config_path {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values a client cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(agent) = &self.client.user_agent {
            if agent.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "client.user_agent".to_string(),
                    value: agent.clone(),
                    reason: "The user agent must identify the caller".to_string(),
                });
            }
        }
        for (field, value) in [
            ("client.api_url", &self.client.api_url),
            ("client.dump_url", &self.client.dump_url),
            ("client.archive_url", &self.client.archive_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                });
            }
        }
        if self.rate_limit.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit.limit".to_string(),
                value: "0".to_string(),
                reason: "The limit must allow at least one request".to_string(),
            });
        }
        Ok(())
    }

    /// Runtime client configuration; `user_agent` overrides the configured one
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if no user agent is available
    pub fn client_config(&self, user_agent: Option<String>) -> ConfigResult<ClientConfig> {
        let user_agent = user_agent
            .or_else(|| self.client.user_agent.clone())
            .filter(|agent| !agent.trim().is_empty())
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "client.user_agent".to_string(),
                value: String::new(),
                reason: "Set a user agent in the config file or the environment".to_string(),
            })?;

        Ok(ClientConfig {
            user_agent,
            api_url: self.client.api_url.clone(),
            dump_url: self.client.dump_url.clone(),
            archive_url: self.client.archive_url.clone(),
            request_timeout: self.client.request_timeout,
            connect_timeout: self.client.connect_timeout,
            pool_idle_timeout: self.client.pool_idle_timeout,
            rate_limit: self.rate_limit,
        })
    }

    /// Runtime dump configuration
    pub fn dump_config(&self) -> DumpConfig {
        let directory = self
            .dumps
            .directory
            .clone()
            .unwrap_or_else(default_dump_directory);

        DumpConfig {
            directory,
            marker_file: self.dumps.marker_file.clone(),
            generation_time: self.dumps.generation_time,
        }
    }

    /// Write a commented default configuration file if none exists yet
    pub async fn initialize(path: &Path) -> ConfigResult<bool> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Read {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Created default configuration file: {}", path.display());
        Ok(true)
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(files::APP_DIR_NAME).join(files::CONFIG_FILE_NAME))
    }

    /// Find configuration file in standard locations
    async fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(".").join(files::CONFIG_FILE_NAME)];
        if let Ok(user_config) = Self::default_config_path() {
            search_paths.push(user_config);
        }

        for path in search_paths {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }
        None
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# NationStates client configuration
# Every setting is optional; the values below are the defaults.

[client]
# Identify yourself to the API, e.g. "MyBot by Testlandia"
# user_agent = ""
api_url = "{api_url}"
dump_url = "{dump_url}"
archive_url = "{archive_url}"
request_timeout = "{request_timeout}s"
connect_timeout = "{connect_timeout}s"
pool_idle_timeout = "{pool_idle_timeout}s"

[rate_limit]
# Requests per server window before the cooldown applies
limit = {limit}
cooldown = "{cooldown}s"
spacing = "{spacing}ms"

[dumps]
# Dump directory (leave unset to use the user cache directory)
# directory = "/path/to/dumps"
# marker_file = "/path/to/{marker}"
generation_time = "{generation_hour:02}:00:00"

[logging]
level = "warn"  # error, warn, info, debug, trace
show_target = false
"#,
            api_url = api::BASE_URL,
            dump_url = api::DUMP_BASE_URL,
            archive_url = api::ARCHIVE_BASE_URL,
            request_timeout = http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout = http::CONNECT_TIMEOUT.as_secs(),
            pool_idle_timeout = http::POOL_IDLE_TIMEOUT.as_secs(),
            limit = limits::DEFAULT_LIMIT,
            cooldown = limits::DEFAULT_COOLDOWN.as_secs(),
            spacing = limits::DEFAULT_SPACING.as_millis(),
            marker = dumps::MARKER_FILE_NAME,
            generation_hour = dumps::GENERATION_HOUR_UTC,
        )
    }
}

/// User cache directory for dumps, falling back to `./dumps`
pub fn default_dump_directory() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(files::APP_DIR_NAME).join("dumps"))
        .unwrap_or_else(|| PathBuf::from("./dumps"))
}
