use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const HTTP_ADDR_ENV: &str = "HABIT_TRACKER_HTTP_ADDR";
pub const DATABASE_ENV: &str = "HABIT_TRACKER_DB";
pub const LOG_FILTER_ENV: &str = "HABIT_TRACKER_LOG";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    InvalidValue { key: &'static str, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::InvalidValue { key, message } => {
                write!(f, "invalid value for '{key}': {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub http_addr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:3000".to_string(),
            database_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Defaults overlaid with whatever the environment sets.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(HTTP_ADDR_ENV) {
            self.http_addr = addr;
        }
        if let Some(path) = lookup(DATABASE_ENV) {
            self.database_path = (!path.trim().is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            self.log_filter = filter;
        }
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_addr
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "http_addr",
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: TrackerConfig = serde_json::from_str(r#"{"log_filter":"debug"}"#).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.http_addr, "0.0.0.0:3000");
        assert!(config.database_path.is_none());
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            (HTTP_ADDR_ENV, "127.0.0.1:8080"),
            (DATABASE_ENV, "/tmp/habits.db"),
        ]);
        let config = TrackerConfig::default()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/habits.db")));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn bad_address_is_reported() {
        let config = TrackerConfig {
            http_addr: "nowhere".into(),
            ..TrackerConfig::default()
        };
        assert!(matches!(
            config.socket_addr(),
            Err(ConfigError::InvalidValue { key: "http_addr", .. })
        ));
    }
}
