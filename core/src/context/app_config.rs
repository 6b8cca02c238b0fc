use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "edlt";

/// Runtime configuration passed explicitly to the monitor and the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the game writes `Journal.*.log` files into.
    pub journal_directory: PathBuf,
    /// SQLite database holding the raw log and projections.
    pub database_path: PathBuf,
    /// Interval of the fallback poll that catches missed watch events.
    pub poll_interval_ms: u64,
    /// Open attempts before the tail reader degrades.
    pub attach_retries: u32,
    /// Base delay between open attempts; doubled after each failure.
    pub attach_backoff_ms: u64,
    /// Upper bound on how long `stop` waits for the worker to quiesce.
    pub stop_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            journal_directory: default_journal_directory(),
            database_path: default_database_path(),
            poll_interval_ms: 1000,
            attach_retries: 5,
            attach_backoff_ms: 100,
            stop_timeout_ms: 2000,
        }
    }
}

impl AppConfig {
    /// Load from the platform config location, falling back to defaults.
    pub fn load() -> Self {
        match confy::load::<AppConfig>(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, self).map_err(ConfigError::Store)
    }

    /// Path of the persisted config file.
    pub fn location() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, None).map_err(ConfigError::Store)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn attach_backoff(&self) -> Duration {
        Duration::from_millis(self.attach_backoff_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

/// Errors from persisting or locating the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config store error: {0}")]
    Store(#[from] confy::ConfyError),
}

fn default_journal_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("Saved Games")
        .join("Frontier Developments")
        .join("Elite Dangerous")
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join(APP_NAME))
        .unwrap_or_default()
        .join("edlt.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"journal_directory":"/tmp/journals"}"#).unwrap();
        assert_eq!(config.journal_directory, PathBuf::from("/tmp/journals"));
        assert_eq!(config.attach_retries, 5);
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
        assert!(config.database_path.ends_with("edlt.db"));
    }

    #[test]
    fn zero_poll_interval_is_raised() {
        let config = AppConfig {
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
