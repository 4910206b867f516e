use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Upper bound for acquiring a pooled connection and for SQLite lock waits
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

/// Credentials for the root super admin created on an empty database
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    pub admin_email: Option<String>,
    pub admin_name: Option<String>,
    pub admin_password: Option<String>,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_token_expiry() -> i64 {
    7 * 24 * 3600 // 7 days
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Longest accepted session lifetime: one year
pub const MAX_TOKEN_EXPIRY_SECONDS: i64 = 365 * 24 * 60 * 60;

fn default_log_filter() -> String {
    "info,tower_http=debug".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Load configuration from keystone.toml in the current directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file("keystone.toml")
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with KEYSTONE_ and nest with a double underscore
    /// Example: KEYSTONE_DATABASE__URL, KEYSTONE_AUTH__JWT_SECRET
    ///
    /// Returns the config and a list of environment variable overrides
    pub fn load_with_env() -> Result<(Self, Vec<String>), ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("keystone").required(false))
            .add_source(
                config::Environment::with_prefix("KEYSTONE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let env_vars = [
            ("KEYSTONE_DATABASE__URL", "database.url"),
            ("KEYSTONE_DATABASE__MAX_CONNECTIONS", "database.max_connections"),
            ("KEYSTONE_DATABASE__ACQUIRE_TIMEOUT_SECONDS", "database.acquire_timeout_seconds"),
            ("KEYSTONE_AUTH__JWT_SECRET", "auth.jwt_secret"),
            ("KEYSTONE_AUTH__TOKEN_EXPIRY_SECONDS", "auth.token_expiry_seconds"),
            ("KEYSTONE_SERVER__HOST", "server.host"),
            ("KEYSTONE_SERVER__PORT", "server.port"),
            ("KEYSTONE_LOG__FILTER", "log.filter"),
            ("KEYSTONE_LOG__JSON", "log.json"),
            ("KEYSTONE_SEED__ADMIN_EMAIL", "seed.admin_email"),
            ("KEYSTONE_SEED__ADMIN_NAME", "seed.admin_name"),
            ("KEYSTONE_SEED__ADMIN_PASSWORD", "seed.admin_password"),
        ];

        let overrides = env_vars
            .iter()
            .filter(|(env_var, _)| std::env::var(env_var).is_ok())
            .map(|(_, config_key)| config_key.to_string())
            .collect();

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok((app_config, overrides))
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must not be empty".to_string()));
        }
        if !(1..=MAX_TOKEN_EXPIRY_SECONDS).contains(&self.auth.token_expiry_seconds) {
            return Err(ConfigError::Message(format!(
                "auth.token_expiry_seconds must be between 1 and {MAX_TOKEN_EXPIRY_SECONDS}"
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
