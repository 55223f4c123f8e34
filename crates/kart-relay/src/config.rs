//! Application configuration.

use crate::error::{AppError, AppResult};
use kart_dashboard::DashboardConfig;
use kart_ws::{ConnectionConfig, StartRequest};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Config file used when neither `--config` nor `KART_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Vendor feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Vendor WebSocket address.
    #[serde(default = "default_vendor_url")]
    pub vendor_url: String,
    /// Subscription identity sent as `ClientKey`.
    #[serde(default = "default_client_key")]
    pub client_key: String,
    /// Track resource sent as `ResourceId`.
    #[serde(default = "default_resource_id")]
    pub resource_id: String,
    /// Fixed wait between reconnect attempts (ms). Default: 5000.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// `remainingSeconds` published before the first race update.
    #[serde(default)]
    pub default_remaining_seconds: u64,
}

fn default_vendor_url() -> String {
    "wss://webserver4.sms-timing.com:10015".to_string()
}

fn default_client_key() -> String {
    "teamsportmanchestertraffordpark".to_string()
}

fn default_resource_id() -> String {
    "19476".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            vendor_url: default_vendor_url(),
            client_key: default_client_key(),
            resource_id: default_resource_id(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            default_remaining_seconds: 0,
        }
    }
}

impl From<&FeedConfig> for ConnectionConfig {
    fn from(cfg: &FeedConfig) -> Self {
        Self {
            url: cfg.vendor_url.clone(),
            reconnect_delay_ms: cfg.reconnect_delay_ms,
            start: StartRequest::new(cfg.client_key.clone(), cfg.resource_id.clone()),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    /// Resolve and load configuration.
    ///
    /// An explicit path must exist. Without one, `config/default.toml` is read
    /// if present, otherwise built-in defaults are used. `PORT` overrides the
    /// dashboard port either way.
    pub fn load(explicit_path: Option<&str>) -> AppResult<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            None => {
                tracing::warn!(path = DEFAULT_CONFIG_PATH, "Config file not found, using defaults");
                Self::default()
            }
        };

        config.apply_port_override(std::env::var("PORT").ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        Self::from_toml_str(&content)
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply a `PORT` value (cloud hosting convention).
    pub fn apply_port_override(&mut self, port: Option<&str>) -> AppResult<()> {
        if let Some(raw) = port {
            self.dashboard.port = raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid PORT value: {raw:?}")))?;
        }
        Ok(())
    }

    /// Reject settings the relay cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        let url = &self.feed.vendor_url;
        if url.is_empty() {
            return Err(AppError::Config("feed.vendor_url is empty".to_string()));
        }
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(AppError::Config(format!(
                "feed.vendor_url must be ws:// or wss://, got {url}"
            )));
        }
        if self.feed.reconnect_delay_ms == 0 {
            return Err(AppError::Config(
                "feed.reconnect_delay_ms must be greater than 0".to_string(),
            ));
        }
        let bind = format!("{}:{}", self.dashboard.host, self.dashboard.port);
        if bind.parse::<SocketAddr>().is_err() {
            return Err(AppError::Config(format!(
                "dashboard.host must be an IP address, got {:?}",
                self.dashboard.host
            )));
        }
        Ok(())
    }

    /// Connection settings for the vendor feed.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::from(&self.feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.feed.vendor_url, "wss://webserver4.sms-timing.com:10015");
        assert_eq!(config.feed.client_key, "teamsportmanchestertraffordpark");
        assert_eq!(config.feed.resource_id, "19476");
        assert_eq!(config.feed.reconnect_delay_ms, 5000);
        assert_eq!(config.dashboard.port, 3000);
        assert_eq!(config.dashboard.static_dir, "public");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [feed]
            resource_id = "20001"

            [dashboard]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.feed.resource_id, "20001");
        assert_eq!(config.feed.client_key, "teamsportmanchestertraffordpark");
        assert_eq!(config.dashboard.port, 8080);
        assert_eq!(config.dashboard.static_dir, "public");
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = AppConfig::from_toml_str("[feed\nvendor_url = 1");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[feed]\nreconnect_delay_ms = 250").unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.feed.reconnect_delay_ms, 250);
    }

    #[test]
    fn test_missing_explicit_file_rejected() {
        let result = AppConfig::load(Some("/nonexistent/kart.toml"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_port_override() {
        let mut config = AppConfig::default();
        config.apply_port_override(Some("8123")).unwrap();
        assert_eq!(config.dashboard.port, 8123);

        config.apply_port_override(None).unwrap();
        assert_eq!(config.dashboard.port, 8123);

        assert!(config.apply_port_override(Some("not-a-port")).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_feed_settings() {
        let mut config = AppConfig::default();
        config.feed.vendor_url = String::new();
        assert!(config.validate().is_err());

        config.feed.vendor_url = "https://webserver4.sms-timing.com".to_string();
        assert!(config.validate().is_err());

        config.feed.vendor_url = "ws://localhost:10015".to_string();
        config.feed.reconnect_delay_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_ip_host() {
        let mut config = AppConfig::default();
        config.dashboard.host = "localhost".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        config.dashboard.host = "127.0.0.1".to_string();
        assert!(config.validate().is_ok());

        config.dashboard.host = "::1".to_string();
        assert!(config.validate().is_err(), "IPv6 needs brackets");

        config.dashboard.host = "[::1]".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_non_ip_host() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard]\nhost = \"localhost\"").unwrap();

        let result = AppConfig::load(Some(file.path().to_str().unwrap()));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_connection_config_from_feed() {
        let config = AppConfig::default();
        let conn = config.connection_config();

        assert_eq!(conn.url, config.feed.vendor_url);
        assert_eq!(conn.reconnect_delay_ms, 5000);
        assert_eq!(conn.start, StartRequest::new("teamsportmanchestertraffordpark", "19476"));
    }
}
