//! Configuration management

use clap::Parser;
use config::{Config as ConfigBuilder, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid database configuration: {0}")]
    InvalidDatabase(String),

    #[error("Invalid security configuration: {0}")]
    InvalidSecurity(String),

    #[error("Invalid payment configuration: {0}")]
    InvalidPayment(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub payment: PaymentConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();

        let mut builder = Self::builder_with_defaults()?;

        // Load from config file if specified
        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(
                    config_path.display().to_string(),
                ));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // Environment variables are prefixed with RAILBOOK_ and use __ for nesting
        // Example: RAILBOOK_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("RAILBOOK")
                .separator("__")
                .try_parsing(true),
        );

        // CLI arguments take the highest priority
        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(db_path) = &cli_args.database {
            builder = builder.set_override("database.path", db_path.display().to_string())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = Self::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from defaults only
    pub fn defaults() -> Result<Self, ConfigError> {
        let config: Config = Self::builder_with_defaults()?.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn builder_with_defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let builder = ConfigBuilder::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.max_connections", 100)?
            .set_default("server.request_timeout", 30)?
            .set_default("database.path", "./data/railbook.db")?
            .set_default("database.connection_pool_size", 10)?
            .set_default("database.busy_timeout", 5000)?
            .set_default("security.jwt_secret", "change-this-secret-in-production")?
            .set_default("security.token_ttl_days", 1)?
            .set_default("security.allowed_origins", vec!["*"])?
            .set_default("payment.settlement_delay_ms", 2000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.output", "stdout")?
            .set_default("logging.max_file_size", 10485760)? // 10 MB
            .set_default("logging.max_backups", 5)?
            .set_default("seed.enable_demo_data", true)?;
        Ok(builder)
    }

    /// Validate every configuration section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.security.validate()?;
        self.payment.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "railbook", about = "Train ticket booking service")]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server host address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Database file path
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
    pub request_timeout: u64, // seconds
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer("host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer(
                "port must be greater than 0".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidServer(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub connection_pool_size: usize,
    pub busy_timeout: u64, // milliseconds
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidDatabase(
                "path cannot be empty".to_string(),
            ));
        }

        if self.connection_pool_size == 0 {
            return Err(ConfigError::InvalidDatabase(
                "connection_pool_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// Token validity window in days. Expiry is the only invalidation
    /// mechanism; there is no revocation list.
    pub token_ttl_days: i64,
    pub allowed_origins: Vec<String>,
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidSecurity(
                "jwt_secret cannot be empty".to_string(),
            ));
        }

        if self.token_ttl_days <= 0 {
            return Err(ConfigError::InvalidSecurity(
                "token_ttl_days must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Fixed simulated settlement delay. Settlement always resolves and is
    /// never cancelled once started.
    pub settlement_delay_ms: u64,
}

impl PaymentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Zero is allowed so tests can settle immediately.
        if self.settlement_delay_ms > 60_000 {
            return Err(ConfigError::InvalidPayment(
                "settlement_delay_ms must not exceed 60000".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
    pub max_file_size: usize, // bytes
    pub max_backups: usize,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "level must be one of: {:?}",
                valid_levels
            )));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "format must be one of: {:?}",
                valid_formats
            )));
        }

        let valid_outputs = ["stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "output must be one of: {:?}",
                valid_outputs
            )));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Seed the demo station/train catalog and demo accounts when the
    /// corresponding tables are empty.
    pub enable_demo_data: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::defaults().unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.security.token_ttl_days, 1);
        assert_eq!(config.payment.settlement_delay_ms, 2000);
        assert!(config.seed.enable_demo_data);
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[server]\nport = 8123\n\n[security]\njwt_secret = \"file-secret\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.security.jwt_secret, "file-secret");
        // Untouched sections keep their defaults
        assert_eq!(config.database.connection_pool_size, 10);
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let result = Config::from_file(Path::new("/nonexistent/railbook.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_validation_rejects_empty_secret() {
        let mut config = Config::defaults().unwrap();
        config.security.jwt_secret = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSecurity(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let mut config = Config::defaults().unwrap();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogging(_))
        ));
    }
}
