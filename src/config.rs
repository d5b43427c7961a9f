//! Run configuration.
//!
//! Settings come from an optional TOML file; every key has a default so an
//! empty file (or no file at all) gives the standard cleaning run.
//!
//! ```toml
//! analysis_window_start = "01/01/2015"
//! batch_size = 10000
//! parallel = true
//! max_threads = 0
//! ```

use crate::core::error::ConfigError;
use crate::core::types::parse_inspection_date;
use crate::execution::engine::ExecutionOptions;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default first day of the analysis window.
pub const DEFAULT_WINDOW_START: &str = "01/01/2015";

/// Default number of input lines per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// The default analysis window start as a date.
pub fn default_window_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Cleaner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// First inspection date kept, as `MM/dd/yyyy`.
    pub analysis_window_start: String,
    /// Input lines validated per batch.
    pub batch_size: usize,
    /// Validate each batch on the rayon pool.
    pub parallel: bool,
    /// Worker threads (0 = rayon default).
    pub max_threads: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            analysis_window_start: DEFAULT_WINDOW_START.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            parallel: true,
            max_threads: 0,
        }
    }
}

impl CleanerConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window_start()?;
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        Ok(())
    }

    /// The analysis window start as a date.
    pub fn window_start(&self) -> Result<NaiveDate, ConfigError> {
        parse_inspection_date(&self.analysis_window_start).ok_or_else(|| {
            ConfigError::InvalidDate {
                value: self.analysis_window_start.clone(),
            }
        })
    }

    /// Engine options matching this config.
    pub fn execution_options(&self) -> ExecutionOptions {
        ExecutionOptions::new()
            .with_parallel(self.parallel)
            .with_max_threads(self.max_threads)
            .with_batch_size(self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CleanerConfig::default();
        assert_eq!(config.window_start().unwrap(), default_window_start());
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = CleanerConfig::from_toml_str("").unwrap();
        assert_eq!(config, CleanerConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = CleanerConfig::from_toml_str(
            r#"
            analysis_window_start = "06/01/2018"
            parallel = false
            "#,
        )
        .unwrap();
        assert_eq!(
            config.window_start().unwrap(),
            NaiveDate::from_ymd_opt(2018, 6, 1).unwrap()
        );
        assert!(!config.parallel);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            CleanerConfig::from_toml_str(r#"analysis_window_start = "2015-01-01""#),
            Err(ConfigError::InvalidDate { .. })
        ));
        assert!(matches!(
            CleanerConfig::from_toml_str("batch_size = 0"),
            Err(ConfigError::InvalidBatchSize)
        ));
        assert!(matches!(
            CleanerConfig::from_toml_str("batch_size = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 250").unwrap();
        writeln!(file, "max_threads = 2").unwrap();

        let config = CleanerConfig::load(file.path()).unwrap();
        assert_eq!(config.batch_size, 250);

        let options = config.execution_options();
        assert_eq!(options.batch_size, 250);
        assert_eq!(options.max_threads, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = CleanerConfig::load(Path::new("/nonexistent/cleaner.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
