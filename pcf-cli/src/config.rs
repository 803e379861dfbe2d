//! Optional TOML configuration for `pcf-wizard`.
//!
//! Every table and key may be omitted; missing values take the library
//! defaults. Command-line flags are applied on top by the binary.
//!
//! ```toml
//! [history]
//! debounce_ms = 500
//! limit = 100
//!
//! [polling]
//! interval_ms = 1000
//! max_attempts = 120
//!
//! [database]
//! backend = "memory"
//! connection_string = ":demo:"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;
use std::time::Duration;

use pcf_core::db::{DbConfig, PollConfig};
use pcf_core::state::HistoryConfig;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: `{key}` must be at least 1")]
    Zero { key: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PcfConfig {
    pub history: HistorySection,
    pub polling: PollingSection,
    pub database: DatabaseSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    pub debounce_ms: u64,
    pub limit: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        let defaults = HistoryConfig::default();
        Self {
            debounce_ms: defaults.debounce_window.as_millis() as u64,
            limit: defaults.limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollingSection {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingSection {
    fn default() -> Self {
        let defaults = PollConfig::default();
        Self {
            interval_ms: defaults.interval.as_millis() as u64,
            max_attempts: defaults.max_attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let defaults = DbConfig::default();
        Self {
            backend: defaults.backend,
            connection_string: defaults.connection_string,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PcfConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.history.limit == 0 {
            return Err(ConfigError::Zero {
                key: "history.limit",
            });
        }
        if self.polling.max_attempts == 0 {
            return Err(ConfigError::Zero {
                key: "polling.max_attempts",
            });
        }
        Ok(())
    }

    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            debounce_window: Duration::from_millis(self.history.debounce_ms),
            limit: self.history.limit,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.polling.interval_ms),
            max_attempts: self.polling.max_attempts,
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.clone(),
            connection_string: self.database.connection_string.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_library_defaults() {
        let config = PcfConfig::from_toml_str("").unwrap();

        assert_eq!(config.history_config(), HistoryConfig::default());
        assert_eq!(config.poll_config(), PollConfig::default());
        assert_eq!(config.db_config(), DbConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = PcfConfig::from_toml_str(
            r#"
            [history]
            debounce_ms = 250

            [database]
            connection_string = "catalog.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.history_config().debounce_window, Duration::from_millis(250));
        assert_eq!(config.history_config().limit, 100);
        assert_eq!(config.db_config().backend, "memory");
        assert_eq!(config.db_config().connection_string, "catalog.toml");
    }

    #[test]
    fn polling_and_logging_are_read() {
        let config = PcfConfig::from_toml_str(
            r#"
            [polling]
            interval_ms = 50
            max_attempts = 3

            [logging]
            level = "pcf_core=debug"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.poll_config(),
            PollConfig {
                interval: Duration::from_millis(50),
                max_attempts: 3,
            }
        );
        assert_eq!(config.logging.level, "pcf_core=debug");
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let result = PcfConfig::from_toml_str("[history]\nlimit = \"lots\"\n");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zero_history_limit_is_rejected() {
        let result = PcfConfig::from_toml_str("[history]\nlimit = 0\n");

        match result {
            Err(ConfigError::Zero { key }) => assert_eq!(key, "history.limit"),
            other => panic!("expected Zero, got {other:?}"),
        }
    }

    #[test]
    fn zero_poll_attempts_are_rejected() {
        let result = PcfConfig::from_toml_str("[polling]\nmax_attempts = 0\n");

        match result {
            Err(ConfigError::Zero { key }) => assert_eq!(key, "polling.max_attempts"),
            other => panic!("expected Zero, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = PcfConfig::load(Path::new("no-such-config.toml"));

        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
