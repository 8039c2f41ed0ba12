//! Configuration management for firebrowse
//!
//! This crate handles the environment, the service account credential file and
//! the optional `.firebrowse/config.toml`.

pub mod credentials;

pub use credentials::Credentials;

use fire_common::{FireError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Collection browsed when no path is given
pub const DEFAULT_COLLECTION: &str = "products";

/// Number of documents fetched when no usable limit is given
pub const DEFAULT_LIMIT: u32 = 10;

/// Points at the service account JSON file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// `host:port` of a local Firestore emulator
pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

/// Overrides the project id found in the credential file
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

pub const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Parse the positional limit argument.
///
/// Firestore takes the limit as an int32. Anything that is not a positive
/// int32 falls back to `default`; a bad limit is never an error.
pub fn parse_limit(raw: Option<&str>, default: u32) -> u32 {
    match raw.map(str::trim).map(str::parse::<i32>) {
        Some(Ok(limit)) if limit > 0 => limit as u32,
        Some(_) => {
            tracing::debug!("Unusable limit {:?}, using {}", raw, default);
            default
        }
        None => default,
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Browse defaults
    #[serde(default)]
    pub browse: BrowseConfig,

    /// Firestore client settings
    #[serde(default)]
    pub client: ClientConfig,
}

/// Browse configuration ([browse])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_collection")]
    pub default_collection: String,

    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}
fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            default_collection: default_collection(),
            default_limit: default_limit(),
        }
    }
}

impl BrowseConfig {
    /// Collection named on the command line, else the configured default
    pub fn collection(&self, arg: Option<&str>) -> String {
        match arg {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => self.default_collection.clone(),
        }
    }

    /// Limit named on the command line, else the configured default
    pub fn limit(&self, arg: Option<&str>) -> u32 {
        parse_limit(arg, self.default_limit)
    }
}

/// Client configuration ([client])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Override for the Firestore REST endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_database")]
    pub database: String,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            endpoint: None,
            database: default_database(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL for REST calls.
    ///
    /// An emulator host wins over the configured endpoint; emulators speak
    /// plain HTTP.
    pub fn base_url(&self, emulator_host: Option<&str>) -> String {
        if let Some(host) = emulator_host {
            return format!("http://{}", host.trim_end_matches('/'));
        }
        self.endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
            .to_string()
    }
}

impl Config {
    /// Load configuration from a directory
    ///
    /// A missing `.firebrowse/config.toml` yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(".firebrowse/config.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        tracing::debug!("Loading config from {:?}", config_path);

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| FireError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| FireError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.browse.default_collection.trim().is_empty() {
            return Err(FireError::ConfigError(
                "browse.default_collection cannot be empty".to_string(),
            ));
        }
        if self.browse.default_limit == 0 || self.browse.default_limit > i32::MAX as u32 {
            return Err(FireError::ConfigError(format!(
                "browse.default_limit must be between 1 and {}",
                i32::MAX
            )));
        }
        if self.client.timeout_secs == 0 {
            return Err(FireError::ConfigError(
                "client.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(endpoint) = &self.client.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(FireError::ConfigError(
                    "client.endpoint must start with http:// or https://".to_string(),
                ));
            }
        }
        if self.client.database.trim().is_empty() {
            return Err(FireError::ConfigError(
                "client.database cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Variables read once at startup, besides the credential path
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub emulator_host: Option<String>,
    pub project_override: Option<String>,
}

impl Environment {
    pub fn capture() -> Self {
        Self {
            emulator_host: non_empty_var(EMULATOR_HOST_ENV),
            project_override: non_empty_var(PROJECT_ENV),
        }
    }
}

pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
