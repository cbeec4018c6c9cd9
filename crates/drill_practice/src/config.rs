//! Drill configuration file.
//!
//! ```toml
//! [engine]
//! max_fixed_point_passes = 32
//! max_expand_terms = 5000
//!
//! [schedule]
//! intervals_days = [1, 2, 4, 7, 14, 30, 60]
//! retry_after_days = 1
//! ```
//!
//! Missing tables and fields take their defaults.

use std::fs;
use std::path::Path;

use drill_engine::EngineLimits;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule::ScheduleConfig;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillConfig {
    pub engine: EngineLimits,
    pub schedule: ScheduleConfig,
}

impl DrillConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Read `path`, falling back to defaults when it is absent or invalid.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = DrillConfig::from_toml("[engine]\nmax_fixed_point_passes = 4\n").unwrap();
        assert_eq!(config.engine.max_fixed_point_passes, 4);
        assert_eq!(config.engine.max_expand_terms, EngineLimits::default().max_expand_terms);
        assert_eq!(config.schedule, ScheduleConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = DrillConfig::default();
        config.schedule.intervals_days = vec![1, 3, 9];
        let text = config.to_toml().unwrap();
        assert_eq!(DrillConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[schedule]\nretry_after_days = \"soon\"").unwrap();
        assert!(DrillConfig::load_from(file.path()).is_err());
        assert_eq!(DrillConfig::load(file.path()), DrillConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(DrillConfig::load(&dir.path().join("drill.toml")), DrillConfig::default());
    }
}
