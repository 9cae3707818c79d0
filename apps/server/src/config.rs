//! Layered configuration for the place server.
//!
//! Sources, later ones winning: `config/default.toml`, `config/local.toml`
//! (both optional), then `PLACEHUB_*` environment variables with `__` as the
//! section separator (e.g. `PLACEHUB_DATABASE__URL`). A `.env` file is
//! loaded first so local development can keep everything in one place.

use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty means no cross-origin access.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// When true, store failures on the search/count paths degrade to an
    /// empty page / zero count instead of surfacing a 500. Callers then
    /// cannot distinguish "no matches" from "search backend down"; the
    /// failure is still logged and counted in metrics.
    #[serde(default = "default_true")]
    pub degrade_on_failure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub file_enabled: bool,
    #[serde(default = "default_file_directory")]
    pub file_directory: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// One of: daily, hourly, minutely, never.
    #[serde(default = "default_file_rotation")]
    pub file_rotation: String,
    #[serde(default = "default_environment")]
    pub deployment_environment: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_directory() -> String {
    "logs".to_string()
}

fn default_file_prefix() -> String {
    "place-server".to_string()
}

fn default_file_rotation() -> String {
    "daily".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            run_migrations: true,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            degrade_on_failure: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file_enabled: false,
            file_directory: default_file_directory(),
            file_prefix: default_file_prefix(),
            file_rotation: default_file_rotation(),
            deployment_environment: default_environment(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PLACEHUB").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.is_empty() {
            return Err("database.url must be set (PLACEHUB_DATABASE__URL)".to_string());
        }
        if !matches!(
            self.logging.file_rotation.as_str(),
            "daily" | "hourly" | "minutely" | "never"
        ) {
            return Err(format!(
                "logging.file_rotation must be one of daily/hourly/minutely/never, got {}",
                self.logging.file_rotation
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_fails_validation_without_database_url() {
        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        let mut config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.server.host = "127.0.0.1".into();
        config.server.port = 9999;
        assert_eq!(
            config.socket_addr().unwrap().to_string(),
            "127.0.0.1:9999"
        );
    }

    #[test]
    fn rejects_unknown_rotation() {
        let mut config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.database.url = "postgres://localhost/placehub".into();
        config.logging.file_rotation = "weekly".into();
        assert!(config.validate().is_err());
    }
}
