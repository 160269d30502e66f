//! Configuration management for adsb-lookup.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.
//!
//! Configuration is read once at the process boundary. Library code receives
//! the resolved values (a dataset path, an API base address) and never looks
//! at the environment itself.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "adsb-lookup";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "ADSB_LOOKUP_";

/// API base used by clients when nothing else is configured.
pub const FALLBACK_API_BASE: &str = "http://localhost:8000";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ADSB_LOOKUP_`, `__` between levels)
/// 2. `SPLUNK_HEC_URL`, `SPLUNK_HEC_TOKEN` and `SPLUNK_INDEX`
/// 3. TOML config file at `~/.config/adsb-lookup/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Dataset configuration.
    pub dataset: DatasetConfig,
    /// Telemetry configuration.
    pub telemetry: TelemetryConfig,
    /// Client configuration.
    pub client: ClientConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Number of records returned by `/aircraft` when no limit is given.
    pub default_limit: usize,
    /// Upper bound for the `limit` parameter.
    pub max_limit: usize,
    /// Send permissive CORS headers so browser and mobile dev clients can call
    /// the API from any origin.
    pub cors_allow_any_origin: bool,
}

/// On-disk format of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    /// Decide from the file extension.
    #[default]
    Auto,
    /// Comma separated values with a header row.
    Csv,
    /// `SQLite` database with an `aircraft` table.
    Sqlite,
}

/// Dataset configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the dataset file.
    pub path: PathBuf,
    /// Dataset format.
    pub format: DatasetFormat,
    /// Upper bound on a single dataset load, in milliseconds.
    pub load_timeout_ms: u64,
    /// Reload the dataset on every request instead of once at startup.
    pub reload_per_request: bool,
}

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Splunk HTTP Event Collector endpoint. Forwarding is off when unset.
    pub hec_url: Option<String>,
    /// Splunk HEC token.
    pub hec_token: Option<String>,
    /// Splunk index to send events to.
    pub index: Option<String>,
    /// Splunk sourcetype for events.
    pub sourcetype: String,
    /// Logical source label.
    pub source: String,
    /// Timeout for a single HEC request, in milliseconds.
    pub timeout_ms: u64,
    /// Verify the collector's TLS certificate. Disable only for development
    /// collectors with self-signed certificates.
    pub verify_tls: bool,
    /// Version tag attached to search events.
    pub app_version: String,
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address of the lookup API.
    pub api_base: Option<String>,
    /// Request timeout, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            default_limit: 25,
            max_limit: 500,
            cors_allow_any_origin: true,
        }
    }
}

impl ServerConfig {
    /// Clamp a requested result limit into `1..=max_limit`, defaulting to
    /// `default_limit` when absent.
    #[must_use]
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("adsb_sample.csv"),
            format: DatasetFormat::Auto,
            load_timeout_ms: 5_000,
            reload_per_request: false,
        }
    }
}

impl DatasetConfig {
    /// The concrete format, resolving `Auto` from the file extension.
    #[must_use]
    pub fn resolved_format(&self) -> DatasetFormat {
        match self.format {
            DatasetFormat::Auto => crate::source::detect_format(&self.path),
            other => other,
        }
    }

    /// Get the load timeout as a Duration.
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            hec_url: None,
            hec_token: None,
            index: None,
            sourcetype: "adsb_api".to_string(),
            source: "adsb-lookup".to_string(),
            timeout_ms: 2_000,
            verify_tls: true,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Check if events should be forwarded to Splunk HEC.
    #[must_use]
    pub fn hec_enabled(&self) -> bool {
        self.hec_url.as_deref().is_some_and(|u| !u.is_empty())
            && self.hec_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Get the HEC timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(&Self::figment(&config_file))
    }

    /// The provider chain used by [`Config::load_from`].
    #[must_use]
    pub fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(splunk_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(Error::config_validation(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }

        if self.server.default_limit == 0 || self.server.max_limit == 0 {
            return Err(Error::config_validation(
                "default_limit and max_limit must be greater than 0",
            ));
        }

        if self.server.default_limit > self.server.max_limit {
            return Err(Error::config_validation(format!(
                "default_limit ({}) cannot be greater than max_limit ({})",
                self.server.default_limit, self.server.max_limit
            )));
        }

        if self.dataset.load_timeout_ms == 0 {
            return Err(Error::config_validation(
                "load_timeout_ms must be greater than 0",
            ));
        }

        if self.telemetry.hec_url.is_some() && self.telemetry.hec_token.is_none() {
            return Err(Error::config_validation(
                "telemetry.hec_url is set but telemetry.hec_token is missing",
            ));
        }

        if let Some(base) = &self.client.api_base {
            validate_api_base(base)?;
        }

        Ok(())
    }

    /// Resolve the lookup API base address.
    ///
    /// An explicit override wins, then the configured value, then
    /// [`FALLBACK_API_BASE`]. Trailing slashes are removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the override is not an http(s) URL.
    pub fn api_base(&self, override_base: Option<&str>) -> Result<String> {
        let base = override_base
            .or(self.client.api_base.as_deref())
            .unwrap_or(FALLBACK_API_BASE);
        validate_api_base(base)?;
        Ok(base.trim_end_matches('/').to_string())
    }

    /// Get the socket address to bind, with an optional override.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not parse.
    pub fn bind_addr(&self, override_bind: Option<&str>) -> Result<SocketAddr> {
        let bind = override_bind.unwrap_or(&self.server.bind);
        bind.parse().map_err(|_| {
            Error::config_validation(format!("bind address is not a socket address: {bind}"))
        })
    }
}

/// Map the legacy Splunk variables onto the telemetry section.
fn splunk_env() -> Env {
    Env::raw().filter_map(|key| {
        if key == "SPLUNK_HEC_URL" {
            Some("telemetry.hec_url".into())
        } else if key == "SPLUNK_HEC_TOKEN" {
            Some("telemetry.hec_token".into())
        } else if key == "SPLUNK_INDEX" {
            Some("telemetry.index".into())
        } else {
            None
        }
    })
}

fn validate_api_base(base: &str) -> Result<()> {
    if base.starts_with("http://") || base.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::config_validation(format!(
            "api_base must start with http:// or https://: {base}"
        )))
    }
}
