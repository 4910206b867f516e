pub mod config;
pub mod telemetry;

pub use config::{AppConfig, AuthConfig, DatabaseConfig, LogConfig, SeedConfig, ServerConfig};
pub use telemetry::init_tracing;
