//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in default (fallback)
//!
//! A missing TOML file is not an error; an unreadable or malformed one is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "FILMDB_DATABASE";

/// Environment variable carrying the OMDb API key
pub const API_KEY_ENV_VAR: &str = "OMDB_API_KEY";

pub const DEFAULT_DATABASE_PATH: &str = "movies.db";
pub const DEFAULT_CACHE_PATH: &str = "omdb_cache.json";
pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 200;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional so a partial (or absent) file falls back to
/// the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// External SQL script executed once before any writes
    #[serde(default)]
    pub schema_path: Option<PathBuf>,

    /// Lookup cache file
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// OMDb provider settings
    #[serde(default)]
    pub omdb: OmdbConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Provider connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on a single provider request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between consecutive provider requests
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_OMDB_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_request_delay_ms() -> u64 {
    DEFAULT_REQUEST_DELAY_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse a TOML config from a string
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load a TOML config file
///
/// With an explicit path the file must exist. Without one, the per-user
/// default location is tried and silently skipped when absent.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config file found, using built-in defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = parse_toml_config(&content)?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Per-user config file location (`<config dir>/filmdb/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("filmdb").join("config.toml"))
}

/// Resolve the database path: CLI → environment → TOML → default
pub fn resolve_database_path(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    toml_config
        .database_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

/// Resolve the OMDb API key
///
/// The key is required: absence is reported as a configuration error
/// so the caller can stop before reading input or touching the database.
pub fn resolve_api_key(cli_arg: Option<&str>) -> Result<String> {
    let key = match cli_arg {
        Some(key) => Some(key.to_string()),
        None => std::env::var(API_KEY_ENV_VAR).ok(),
    };

    match key {
        Some(key) if is_valid_key(&key) => Ok(key.trim().to_string()),
        _ => Err(Error::Config(format!(
            "{} environment variable not set. Export your OMDb API key and re-run.",
            API_KEY_ENV_VAR
        ))),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
