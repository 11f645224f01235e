use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{BidrelayError, Result};

/// Environment variable holding the upstream webhook URL unless overridden
pub const DEFAULT_WEBHOOK_ENV: &str = "N8N_WEBHOOK_URL";

/// Main configuration structure for bidrelay
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Relay endpoint configuration
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Relay endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Address to listen on (e.g., "127.0.0.1:3000")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Route the relay handler is mounted on
    #[serde(default = "default_route")]
    pub route: String,
    /// Environment variable read on every request for the webhook URL
    #[serde(default = "default_webhook_env")]
    pub webhook_env: String,
    /// Fixed webhook URL; takes precedence over `webhook_env` when set
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Upstream request timeout in seconds (unset = wait indefinitely)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Largest inbound body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            route: default_route(),
            webhook_env: default_webhook_env(),
            webhook_url: None,
            timeout_secs: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_route() -> String {
    crate::contract::RELAY_PATH.to_string()
}

fn default_webhook_env() -> String {
    DEFAULT_WEBHOOK_ENV.to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BidrelayError::Config(format!("Failed to parse config: {e}")))
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BidrelayError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Load the config from an explicit path, or the first default location
    /// that exists, or fall back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        for path in default_config_paths().iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }
}

fn default_config_paths() -> [Option<PathBuf>; 3] {
    [
        dirs::home_dir().map(|h| h.join(".bidrelay").join("config.toml")),
        dirs::config_dir().map(|c| c.join("bidrelay").join("config.toml")),
        Some(PathBuf::from("bidrelay.toml")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.relay.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.relay.route, "/relay");
        assert_eq!(config.relay.webhook_env, "N8N_WEBHOOK_URL");
        assert!(config.relay.webhook_url.is_none());
        assert!(config.relay.timeout_secs.is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.relay.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.relay.max_body_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn test_partial_relay_section() {
        let config = Config::from_toml(
            r#"
            [relay]
            listen_addr = "0.0.0.0:8080"
            webhook_env = "BID_WEBHOOK"
            timeout_secs = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.relay.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.relay.webhook_env, "BID_WEBHOOK");
        assert_eq!(config.relay.timeout_secs, Some(120));
        assert_eq!(config.relay.route, "/relay");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml("[relay\nlisten_addr = ").unwrap_err();
        assert!(matches!(err, BidrelayError::Config(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[relay]\nwebhook_url = \"https://example.app.n8n.cloud/webhook/abc\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(
            config.relay.webhook_url.as_deref(),
            Some("https://example.app.n8n.cloud/webhook/abc")
        );
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
