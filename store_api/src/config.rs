// store_api/src/config.rs

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dotenvy::dotenv;
use serde::Deserialize;

use crate::errors::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/configs.toml";
const ENV_PREFIX: &str = "STORE_API";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub server: ServerConfig,
  pub database: DatabaseConfig,
  pub orders: OrdersConfig,
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Listen address as `host:port`.
  pub host: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: "127.0.0.1:8080".to_string(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  #[default]
  Postgres,
  Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
  pub backend: StoreBackend,
  pub url: Option<String>,
  pub max_connections: u32,
  pub acquire_timeout_ms: u64,
  pub query_timeout_ms: u64,
  pub run_migrations: bool,
}

impl Default for DatabaseConfig {
  fn default() -> Self {
    Self {
      backend: StoreBackend::Postgres,
      url: None,
      max_connections: 10,
      acquire_timeout_ms: 3_000,
      query_timeout_ms: 5_000,
      run_migrations: true,
    }
  }
}

impl DatabaseConfig {
  pub fn acquire_timeout(&self) -> Duration {
    Duration::from_millis(self.acquire_timeout_ms)
  }

  pub fn query_timeout(&self) -> Duration {
    Duration::from_millis(self.query_timeout_ms)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
  /// Hours between placing an order and its `finish_time`.
  pub fulfillment_hours: i64,
}

impl Default for OrdersConfig {
  fn default() -> Self {
    Self { fulfillment_hours: 72 }
  }
}

impl OrdersConfig {
  pub fn fulfillment_window(&self) -> chrono::Duration {
    chrono::Duration::hours(self.fulfillment_hours)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  #[default]
  Pretty,
  Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  pub level: String,
  pub format: LogFormat,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      format: LogFormat::Pretty,
    }
  }
}

impl AppConfig {
  /// Loads `.env`, then the file named by `STORE_API_CONFIG` (or
  /// `config/configs.toml`), then `STORE_API__*` environment overrides.
  pub fn load() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let config_path = env::var("STORE_API_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    Self::load_from(Path::new(&config_path))
  }

  pub fn load_from(path: &Path) -> Result<Self> {
    let mut builder = config::Config::builder();
    if path.exists() {
      builder = builder.add_source(config::File::from(PathBuf::from(path)));
    } else {
      tracing::warn!("Config file {} not found, using defaults and environment.", path.display());
    }
    builder = builder.add_source(
      config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true),
    );

    let settings = builder
      .build()
      .map_err(|e| AppError::Config(format!("Failed to read configuration: {}", e)))?;
    let app_config: Self = settings
      .try_deserialize()
      .map_err(|e| AppError::Config(format!("Invalid configuration: {}", e)))?;
    app_config.validate()?;

    tracing::info!("Application configuration loaded successfully.");
    Ok(app_config)
  }

  fn validate(&self) -> Result<()> {
    if self.server.host.trim().is_empty() {
      return Err(AppError::Config("server.host must not be empty".to_string()));
    }
    if self.database.backend == StoreBackend::Postgres
      && self.database.url.as_deref().map_or(true, |url| url.trim().is_empty())
    {
      return Err(AppError::Config(
        "database.url is required for the postgres backend".to_string(),
      ));
    }
    if self.database.query_timeout_ms == 0 {
      return Err(AppError::Config("database.query_timeout_ms must be positive".to_string()));
    }
    if self.orders.fulfillment_hours <= 0 {
      return Err(AppError::Config("orders.fulfillment_hours must be positive".to_string()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::io::Write;

  fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  #[serial]
  fn file_values_override_defaults() {
    let file = write_config(
      r#"
      [server]
      host = "0.0.0.0:9000"

      [database]
      backend = "memory"
      query_timeout_ms = 250

      [orders]
      fulfillment_hours = 24
      "#,
    );
    let cfg = AppConfig::load_from(file.path()).unwrap();
    assert_eq!(cfg.server.host, "0.0.0.0:9000");
    assert_eq!(cfg.database.backend, StoreBackend::Memory);
    assert_eq!(cfg.database.query_timeout(), Duration::from_millis(250));
    assert_eq!(cfg.database.max_connections, 10);
    assert_eq!(cfg.orders.fulfillment_window(), chrono::Duration::hours(24));
    assert_eq!(cfg.logging.format, LogFormat::Pretty);
  }

  #[test]
  #[serial]
  fn postgres_backend_requires_a_url() {
    let file = write_config("[server]\nhost = \"127.0.0.1:8080\"\n");
    let err = AppConfig::load_from(file.path()).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("database.url")));
  }

  #[test]
  #[serial]
  fn environment_overrides_file() {
    let file = write_config("[database]\nbackend = \"memory\"\n");
    env::set_var("STORE_API__SERVER__HOST", "127.0.0.1:7777");
    let cfg = AppConfig::load_from(file.path());
    env::remove_var("STORE_API__SERVER__HOST");
    assert_eq!(cfg.unwrap().server.host, "127.0.0.1:7777");
  }
}
