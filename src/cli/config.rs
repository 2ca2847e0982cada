//! Configuration file
//!
//! ```json
//! { "archive_dir": "./archive", "batching_interval_hours": 24, "halt_on_error": true }
//! ```
//!
//! Only `archive_dir` is required.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::minor_versions::{ReconstructorConfig, DEFAULT_BATCHING_INTERVAL_HOURS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Archive directory (required)
    pub archive_dir: String,

    /// Gap in hours that starts a new minor version (default 24)
    #[serde(default = "default_batching_interval_hours")]
    pub batching_interval_hours: i64,

    /// Stop `minor-versions` at the first failing collection (default true)
    #[serde(default = "default_halt_on_error")]
    pub halt_on_error: bool,
}

fn default_batching_interval_hours() -> i64 {
    DEFAULT_BATCHING_INTERVAL_HOURS
}
fn default_halt_on_error() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.archive_dir.trim().is_empty() {
            return Err(CliError::config_error("archive_dir must not be empty"));
        }
        if self.batching_interval_hours <= 0 {
            return Err(CliError::config_error(format!(
                "batching_interval_hours must be > 0, got {}",
                self.batching_interval_hours
            )));
        }
        if Duration::try_hours(self.batching_interval_hours).is_none() {
            return Err(CliError::config_error(format!(
                "batching_interval_hours out of range: {}",
                self.batching_interval_hours
            )));
        }
        Ok(())
    }

    pub fn archive_path(&self) -> &Path {
        Path::new(&self.archive_dir)
    }

    pub fn reconstructor_config(&self) -> ReconstructorConfig {
        ReconstructorConfig::with_interval_hours(self.batching_interval_hours)
    }
}
