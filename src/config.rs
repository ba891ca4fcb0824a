//! # Configuration bundle.
//!
//! [`Config`] holds one subsection per component kind. It is parsed once at
//! startup from a TOML file and then shared read-only with every constructor.
//!
//! ## Example file
//! ```toml
//! [gateway]
//! api_exposed_url = "http://localhost:8000"
//! web = { listen_address = "127.0.0.1:8000" }
//!
//! [runservice]
//! data_dir = "/var/lib/platform/runservice"
//! web = { listen_address = "127.0.0.1:4000" }
//!
//! [scheduler]
//! interval_ms = 5000
//! ```
//!
//! Missing sections and fields fall back to their defaults. Validation of the
//! individual values belongs to each component's constructor.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default externally reachable gateway URL.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ReadFile { .. } => "config_read_file",
            ConfigError::ParseToml { .. } => "config_parse_toml",
        }
    }
}

/// The whole configuration bundle, one subsection per component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub runservice: RunserviceConfig,
    pub executor: ExecutorConfig,
    pub configstore: ConfigstoreConfig,
    pub scheduler: SchedulerConfig,
    pub notification: NotificationConfig,
    pub gateway: GatewayConfig,
    pub gitserver: GitserverConfig,
}

impl Config {
    /// Reads and parses the bundle at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(path, &raw)
    }

    /// Parses a bundle from TOML text; `origin` is only used in error messages.
    pub fn parse(origin: impl AsRef<Path>, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::ParseToml {
            path: origin.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Listening socket of a network-facing component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebConfig {
    pub listen_address: String,
}

impl WebConfig {
    fn on_port(port: u16) -> Self {
        Self {
            listen_address: format!("127.0.0.1:{port}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunserviceConfig {
    pub data_dir: PathBuf,
    pub web: WebConfig,
}

impl Default for RunserviceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/runservice"),
            web: WebConfig::on_port(4000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    pub data_dir: PathBuf,
    pub web: WebConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/executor"),
            web: WebConfig::on_port(4001),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigstoreConfig {
    pub data_dir: PathBuf,
    pub web: WebConfig,
}

impl Default for ConfigstoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/configstore"),
            web: WebConfig::on_port(4002),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Tick period in milliseconds (must be > 0).
    pub interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { interval_ms: 10_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    /// Tick period in milliseconds (must be > 0).
    pub interval_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { interval_ms: 10_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// URL under which the gateway is reachable by users and other services.
    pub api_exposed_url: String,
    pub web: WebConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_exposed_url: DEFAULT_GATEWAY_URL.to_string(),
            web: WebConfig::on_port(8000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitserverConfig {
    pub data_dir: PathBuf,
    pub web: WebConfig,
}

impl Default for GitserverConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/gitserver"),
            web: WebConfig::on_port(4003),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = Config::parse("inline", "").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.gateway.api_exposed_url, DEFAULT_GATEWAY_URL);
    }

    #[test]
    fn sections_override_defaults() {
        let raw = r#"
            [gateway]
            api_exposed_url = "https://ci.example.org"
            web = { listen_address = "0.0.0.0:9000" }

            [scheduler]
            interval_ms = 250
        "#;
        let cfg = Config::parse("inline", raw).unwrap();
        assert_eq!(cfg.gateway.api_exposed_url, "https://ci.example.org");
        assert_eq!(cfg.gateway.web.listen_address, "0.0.0.0:9000");
        assert_eq!(cfg.scheduler.interval_ms, 250);
        assert_eq!(cfg.executor, ExecutorConfig::default());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = Config::parse("bad.toml", "[frobnicator]\nx = 1\n").unwrap_err();
        assert_eq!(err.as_label(), "config_parse_toml");
        assert!(err.to_string().contains("bad.toml"));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).await.unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notification]\ninterval_ms = 42\n").unwrap();
        let cfg = Config::load(&path).await.unwrap();
        assert_eq!(cfg.notification.interval_ms, 42);
    }
}
