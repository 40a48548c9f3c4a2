use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::query::QueryConfig;

/// Main configuration structure for `q`
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Defaults for every query issued in one invocation
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. q.toml in current directory
    /// 3. /etc/ferrous-q/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("q.toml").exists() {
            Self::from_file("q.toml")?
        } else if std::path::Path::new("/etc/ferrous-q/config.toml").exists() {
            Self::from_file("/etc/ferrous-q/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.query.port = port;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.query.timeout_ms = timeout_ms;
        }
        if overrides.fallback {
            self.query.fallback = true;
        }
        if overrides.tcp {
            self.query.tcp = true;
        }
        if let Some(rd) = overrides.recursion_desired {
            self.query.recursion_desired = rd;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.port == 0 {
            return Err(ConfigError::Validation("Query port cannot be 0".to_string()));
        }

        if self.query.udp_payload_size < 512 {
            return Err(ConfigError::Validation(format!(
                "UDP payload size {} is below the 512 byte minimum",
                self.query.udp_payload_size
            )));
        }

        Ok(())
    }
}

/// Command-line values that take precedence over the config file.
///
/// Boolean switches can only turn a feature on; absent flags leave the
/// file value untouched.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
    pub fallback: bool,
    pub tcp: bool,
    pub recursion_desired: Option<bool>,
    pub log_level: Option<String>,
}
