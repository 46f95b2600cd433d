//! Configuration management for fileshare
//!
//! Config files are stored in platform-appropriate locations:
//! - Linux: ~/.config/fileshare/
//! - macOS: ~/Library/Application Support/fileshare/
//! - Windows: %APPDATA%\fileshare\

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoDirFound,

    #[error("Unknown server: {0}")]
    UnknownServer(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    /// Known backends
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

/// Client-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the server to use when none is given
    pub default_server: Option<String>,

    /// Path prefix of the REST API on every server
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Session file location (defaults to the platform data dir)
    pub storage_path: Option<PathBuf>,
}

/// A known backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Display name, used with `--server`
    pub name: String,

    /// Base URL, e.g. `https://files.example.com`
    pub url: String,
}

fn default_api_prefix() -> String {
    crate::DEFAULT_API_PREFIX.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_server: None,
            api_prefix: default_api_prefix(),
            storage_path: None,
        }
    }
}

impl Config {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("fileshare"))
            .ok_or(ConfigError::NoDirFound)
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get server config by name
    pub fn get_server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Add or update server
    pub fn upsert_server(&mut self, server: ServerConfig) {
        if let Some(existing) = self.servers.iter_mut().find(|s| s.name == server.name) {
            *existing = server;
        } else {
            self.servers.push(server);
        }
    }

    /// Resolve the base URL to talk to
    ///
    /// An explicit name must exist; otherwise the configured default server
    /// is used, falling back to `DEFAULT_SERVER_URL`.
    pub fn server_url(&self, name: Option<&str>) -> Result<String, ConfigError> {
        if let Some(name) = name {
            return self
                .get_server(name)
                .map(|s| s.url.clone())
                .ok_or_else(|| ConfigError::UnknownServer(name.to_string()));
        }

        Ok(self
            .client
            .default_server
            .as_deref()
            .and_then(|name| self.get_server(name))
            .map(|s| s.url.clone())
            .unwrap_or_else(|| crate::DEFAULT_SERVER_URL.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.client.api_prefix, "/api");
        assert_eq!(config.server_url(None).unwrap(), crate::DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.upsert_server(ServerConfig {
            name: "home".to_string(),
            url: "http://192.0.2.10:8080".to_string(),
        });
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[client]"));
        assert!(toml.contains("[[servers]]"));

        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.servers, config.servers);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[client]\ndefault_server = \"home\"\n").unwrap();
        assert_eq!(parsed.client.api_prefix, "/api");
        assert!(parsed.servers.is_empty());
        // Default names a server that is not configured
        assert_eq!(parsed.server_url(None).unwrap(), crate::DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_server_resolution() {
        let mut config = Config::default();
        config.upsert_server(ServerConfig {
            name: "home".to_string(),
            url: "http://192.0.2.10:8080".to_string(),
        });
        config.upsert_server(ServerConfig {
            name: "work".to_string(),
            url: "https://files.example.com".to_string(),
        });
        config.client.default_server = Some("work".to_string());

        assert_eq!(config.server_url(None).unwrap(), "https://files.example.com");
        assert_eq!(config.server_url(Some("home")).unwrap(), "http://192.0.2.10:8080");
        assert!(matches!(
            config.server_url(Some("lab")),
            Err(ConfigError::UnknownServer(_))
        ));
    }

    #[test]
    fn test_server_upsert() {
        let mut config = Config::default();

        config.upsert_server(ServerConfig {
            name: "home".to_string(),
            url: "http://192.0.2.10:8080".to_string(),
        });
        config.upsert_server(ServerConfig {
            name: "home".to_string(),
            url: "http://192.0.2.11:8080".to_string(),
        });

        assert_eq!(config.servers.len(), 1);
        assert!(config.servers[0].url.contains("192.0.2.11"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let mut config = Config::default();
        config.client.storage_path = Some(dir.path().join("session.json"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.client.storage_path, config.client.storage_path);
    }
}
