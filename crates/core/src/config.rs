use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// Cookie signing secret; required
    #[serde(default)]
    pub secret: String,
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

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// JSON snapshot file; in-memory only when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Insert the starter user and jokes on boot
    #[serde(default)]
    pub seed: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Environment variables that override file settings, with the key they set
const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("SESSION_SECRET", "session.secret"),
    ("JOKES_SESSION_SECRET", "session.secret"),
    ("JOKES_SERVER_HOST", "server.host"),
    ("JOKES_SERVER_PORT", "server.port"),
    ("JOKES_DATABASE_PATH", "database.path"),
    ("JOKES_DATABASE_SEED", "database.seed"),
];

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

    /// Load configuration from jokes.toml in the current directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file("jokes.toml")
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with JOKES_
    /// Example: JOKES_SERVER_PORT, JOKES_SESSION_SECRET
    /// `SESSION_SECRET` is honored as well and takes precedence.
    ///
    /// Returns the config and a list of environment variable overrides
    pub fn load_with_env() -> Result<(Self, Vec<String>), ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("jokes").required(false))
            .add_source(Environment::with_prefix("JOKES").separator("_"))
            .set_override_option("session.secret", std::env::var("SESSION_SECRET").ok())?
            .build()?;

        let mut overrides = Vec::new();
        for (env_var, config_key) in ENV_OVERRIDES {
            if std::env::var(env_var).is_ok() && !overrides.iter().any(|k| k == config_key) {
                overrides.push(config_key.to_string());
            }
        }

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok((app_config, overrides))
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "SESSION_SECRET must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
