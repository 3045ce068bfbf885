//! TOML configuration for the realtime replay tool.
//!
//! ```toml
//! [client]
//! log_level = "debug"
//!
//! [transport]
//! resource_endpoint = "https://contoso.communication.azure.com"
//! gateway_api_version = "2024-03-07"
//!
//! [transport.passthrough]
//! keep_alive_secs = 30
//! ```
//!
//! Every field has a serde default, so an empty file (or no file at all)
//! yields a working configuration.  The `[transport]` table deserializes
//! straight into [`TransportOptions`], and `[transport.passthrough]` is handed
//! to the transport factory untouched.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::transport::TransportOptions;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub transport: TransportOptions,
}

impl ClientConfig {
    /// Replaces the configured log level when `level` is given, as the
    /// command line's `--log-level` does.
    pub fn with_log_level(mut self, level: Option<&str>) -> Self {
        if let Some(level) = level {
            self.client.log_level = level.to_string();
        }
        self
    }
}

/// General client behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSection {
    /// `tracing` filter used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"chat_realtime_client=debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads a [`ClientConfig`] from `path`, returning the default configuration
/// if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::transport::DEFAULT_GATEWAY_API_VERSION;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("chat-realtime-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_default_config_logs_at_info_with_default_api_version() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.client.log_level, "info");
        assert_eq!(cfg.transport.gateway_api_version, DEFAULT_GATEWAY_API_VERSION);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: ClientConfig = toml::from_str("").expect("empty TOML is valid");
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_passthrough_table_is_kept_verbatim() {
        // Arrange
        let toml_str = r#"
[transport]
resource_endpoint = "https://contoso.communication.azure.com"

[transport.passthrough]
keep_alive_secs = 30
region = "westeurope"
"#;

        // Act
        let cfg: ClientConfig = toml::from_str(toml_str).expect("deserialize");

        // Assert
        let passthrough = &cfg.transport.passthrough;
        assert_eq!(passthrough["keep_alive_secs"], serde_json::json!(30));
        assert_eq!(passthrough["region"], serde_json::json!("westeurope"));
        assert_eq!(cfg.transport.gateway_api_version, "2024-03-07");
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let path = scratch_path("absent.toml");
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_save_then_load_restores_config() {
        // Arrange
        let path = scratch_path("config.toml");
        let mut cfg = ClientConfig::default();
        cfg.client.log_level = "debug".to_string();
        cfg.transport.resource_endpoint = "https://fabrikam.communication.azure.com".to_string();

        // Act
        save_config_to(&path, &cfg).expect("save");
        let restored = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(restored, cfg);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_log_level_override_is_written_and_read_back() {
        // Arrange: a config file that does not exist yet
        let path = scratch_path("init.toml");
        let cfg = load_config_from(&path)
            .expect("missing file is not an error")
            .with_log_level(Some("chat_realtime_client=trace"));

        // Act
        save_config_to(&path, &cfg).expect("save");
        let restored = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(restored.client.log_level, "chat_realtime_client=trace");
        assert_eq!(restored.transport, TransportOptions::default());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_absent_log_level_override_keeps_configured_level() {
        let cfg = ClientConfig::default().with_log_level(None);
        assert_eq!(cfg.client.log_level, "info");
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let path = scratch_path("broken.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[client\nlog_level = ").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
