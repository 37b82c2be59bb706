pub mod config;
pub use config::{AppConfig, DatabaseConfig, ServerConfig, SessionConfig};

pub use ::config::ConfigError;
