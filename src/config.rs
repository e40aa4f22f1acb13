use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub busy_timeout_ms: u64,
    pub static_dir: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("5000")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = non_empty(&env_map, "DATABASE_PATH", "responses.db")?;

        let busy_timeout_ms = env_map
            .get("SQLITE_BUSY_TIMEOUT_MS")
            .map(|s| s.as_str())
            .unwrap_or("5000")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "SQLITE_BUSY_TIMEOUT_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let static_dir = non_empty(&env_map, "STATIC_DIR", "static")?;

        Ok(Config {
            port,
            database_path,
            busy_timeout_ms,
            static_dir,
        })
    }

    /// How long a writer waits on a locked database before giving up.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn non_empty(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match env_map.get(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must not be empty".to_string(),
        )),
        Some(value) => Ok(value.clone()),
        None => Ok(default.to_string()),
    }
}
