//! TOML configuration for the verification service.
//!
//! The config file carries the transport and logging knobs the core never
//! sees: listen port, log destinations, and the path of the issuer
//! ruleset. Every value can be overridden by a command-line flag on the
//! server binary.
//!
//! ```toml
//! title = "pancheck"
//!
//! [http]
//! port = 8080
//! access_log_path = ""
//! error_log_path = ""
//! card_types_path = "card_types.json"
//! ```
//!
//! Empty log paths mean stdout.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Free-form service title, used in log lines only.
    #[serde(default)]
    pub title: String,
    /// HTTP transport and logging settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP transport and logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Port to listen on.
    pub port: u16,
    /// Access log destination; empty means stdout.
    pub access_log_path: String,
    /// Error log destination; empty folds errors into the access log.
    pub error_log_path: String,
    /// Path of the issuer ruleset JSON document.
    pub card_types_path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            access_log_path: String::new(),
            error_log_path: String::new(),
            card_types_path: "card_types.json".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(ConfigError::Toml)
    }
}

/// Error type for configuration loading. Fatal at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// The config path was empty.
    EmptyPath,
    /// Failed to read the config file.
    Io(std::io::Error),
    /// The file was not valid TOML for the expected shape.
    Toml(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "Unable to open file from an empty path"),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Toml(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            title = "pancheck"

            [http]
            port = 9090
            access_log_path = "/var/log/pancheck/access.log"
            error_log_path = "/var/log/pancheck/error.log"
            card_types_path = "rules/card_types.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.title, "pancheck");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.access_log_path, "/var/log/pancheck/access.log");
        assert_eq!(config.http.error_log_path, "/var/log/pancheck/error.log");
        assert_eq!(config.http.card_types_path, "rules/card_types.json");
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.http.port, 8080);
        assert!(config.http.access_log_path.is_empty());
        assert_eq!(config.http.card_types_path, "card_types.json");

        let config: Config = toml::from_str("[http]\nport = 3000\n").unwrap();
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.http.card_types_path, "card_types.json");
    }

    #[test]
    fn test_empty_path() {
        let err = Config::from_path("").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPath));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_path("no/such/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err: Result<Config, _> = toml::from_str("http = not toml");
        assert!(err.is_err());
    }
}
