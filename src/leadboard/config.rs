use crate::error::{LeadboardError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";

/// Query timing, stored in `<data dir>/config.json`.
///
/// Every field falls back to its default when absent, so a partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LeadboardConfig {
    /// Staleness window for list and get queries, in seconds
    pub stale_secs: u64,

    /// Staleness window for the two stats queries, in seconds
    pub stats_stale_secs: u64,

    /// Simulated source latency, in milliseconds
    pub list_latency_ms: u64,
    pub page_latency_ms: u64,
    pub get_latency_ms: u64,
    pub stats_latency_ms: u64,
}

impl Default for LeadboardConfig {
    fn default() -> Self {
        Self {
            stale_secs: 5 * 60,
            stats_stale_secs: 2 * 60,
            list_latency_ms: 300,
            page_latency_ms: 200,
            get_latency_ms: 100,
            stats_latency_ms: 100,
        }
    }
}

impl LeadboardConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(LeadboardError::Io)?;
        serde_json::from_str(&content).map_err(|e| {
            LeadboardError::Config(format!("{}: {}", config_path.display(), e))
        })
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(LeadboardError::Io)?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(LeadboardError::Serialization)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content).map_err(LeadboardError::Io)?;
        Ok(())
    }

    /// A config with no simulated latency, for tests and scripted use.
    pub fn instant() -> Self {
        Self {
            list_latency_ms: 0,
            page_latency_ms: 0,
            get_latency_ms: 0,
            stats_latency_ms: 0,
            ..Self::default()
        }
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    pub fn stats_stale_time(&self) -> Duration {
        Duration::from_secs(self.stats_stale_secs)
    }

    pub fn list_latency(&self) -> Duration {
        Duration::from_millis(self.list_latency_ms)
    }

    pub fn page_latency(&self) -> Duration {
        Duration::from_millis(self.page_latency_ms)
    }

    pub fn get_latency(&self) -> Duration {
        Duration::from_millis(self.get_latency_ms)
    }

    pub fn stats_latency(&self) -> Duration {
        Duration::from_millis(self.stats_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LeadboardConfig::default();
        assert_eq!(config.stale_time(), Duration::from_secs(300));
        assert_eq!(config.stats_stale_time(), Duration::from_secs(120));
        assert_eq!(config.list_latency(), Duration::from_millis(300));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = LeadboardConfig::load(dir.path()).unwrap();
        assert_eq!(config, LeadboardConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");

        let config = LeadboardConfig {
            stale_secs: 10,
            ..LeadboardConfig::instant()
        };
        config.save(&root).unwrap();

        assert_eq!(LeadboardConfig::load(&root).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"listLatencyMs": 0}"#).unwrap();

        let config = LeadboardConfig::load(dir.path()).unwrap();
        assert_eq!(config.list_latency_ms, 0);
        assert_eq!(config.stale_secs, 300);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"staleSecs": "soon"}"#).unwrap();

        assert!(matches!(
            LeadboardConfig::load(dir.path()),
            Err(LeadboardError::Config(_))
        ));
    }
}
