//! Configuration management
//!
//! Configuration is loaded from `config.yml` and can be overridden by
//! environment variables. A missing file falls back to defaults; a
//! malformed file or connection URL is fatal at startup with a
//! descriptive diagnostic.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/infarm.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Recognized variables:
    /// - `INFARM_SERVER_HOST`
    /// - `INFARM_SERVER_PORT`
    /// - `INFARM_SERVER_CORS_ORIGIN`
    /// - `INFARM_DATABASE_DRIVER`
    /// - `INFARM_DATABASE_URL`
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("INFARM_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("INFARM_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(origin) = std::env::var("INFARM_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Ok(driver) = std::env::var("INFARM_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                other => tracing::warn!("Ignoring unknown database driver '{}'", other),
            }
        }
        if let Ok(url) = std::env::var("INFARM_DATABASE_URL") {
            self.database.url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.driver, DatabaseDriver::Sqlite);
        assert_eq!(config.database.url, "data/infarm.db");
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/config.yml"))
            .expect("Missing file should not error");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_valid_yaml() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.yml");
        let mut file = std::fs::File::create(&path).expect("Failed to create file");
        writeln!(
            file,
            "server:\n  port: 9090\ndatabase:\n  driver: mysql\n  url: mysql://localhost/infarm"
        )
        .expect("Failed to write file");

        let config = Config::load(&path).expect("Failed to load config");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.driver, DatabaseDriver::Mysql);
        assert_eq!(config.database.url, "mysql://localhost/infarm");
        // Unspecified values fall back to defaults
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.yml");
        std::fs::File::create(&path).expect("Failed to create file");

        let config = Config::load(&path).expect("Empty file should not error");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.yml");
        let mut file = std::fs::File::create(&path).expect("Failed to create file");
        writeln!(file, "server: [not: a mapping").expect("Failed to write file");

        let result = Config::load(&path);
        assert!(result.is_err());
        let message = format!("{}", result.unwrap_err());
        assert!(message.contains("Failed to parse config file"));
    }
}
