/// Sort pacing configuration
///
/// Loaded from a JSON file in the user's config directory:
/// - Linux: ~/.config/library-manager/config.json
/// - macOS: ~/Library/Application Support/library-manager/config.json
/// - Windows: %APPDATA%\library-manager\config.json
///
/// A missing file means "use the defaults".

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Default pause after highlighting a comparison (seconds)
const DEFAULT_COMPARE_DELAY: f64 = 0.3;

/// Default pause after each pass's swap (seconds)
const DEFAULT_SWAP_DELAY: f64 = 0.4;

/// How fast the visual sort advances
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SortConfig {
    /// Pause between `CompareStart` and the comparison itself
    pub compare_delay_seconds: f64,
    /// Pause after each `Swap` event
    pub swap_delay_seconds: f64,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            compare_delay_seconds: DEFAULT_COMPARE_DELAY,
            swap_delay_seconds: DEFAULT_SWAP_DELAY,
        }
    }
}

impl SortConfig {
    /// A config with no pauses at all, handy for tests
    #[cfg(test)]
    pub fn instant() -> Self {
        Self {
            compare_delay_seconds: 0.0,
            swap_delay_seconds: 0.0,
        }
    }

    /// Load from the default location, falling back to defaults if no file exists
    pub fn load() -> Result<Self, ConfigError> {
        match Self::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not determine config directory, using default sort delays");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific file, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        log::info!("⚙️  Loaded sort config from {}", path.display());
        Ok(config)
    }

    /// Parse from a JSON string. Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject delays that cannot become a `Duration`
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_delay("compareDelaySeconds", self.compare_delay_seconds)?;
        check_delay("swapDelaySeconds", self.swap_delay_seconds)?;
        Ok(())
    }

    pub fn compare_delay(&self) -> Duration {
        Duration::from_secs_f64(self.compare_delay_seconds)
    }

    pub fn swap_delay(&self) -> Duration {
        Duration::from_secs_f64(self.swap_delay_seconds)
    }

    /// Get the path where the config file is expected
    fn get_config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("library-manager");
        path.push("config.json");
        Some(path)
    }
}

fn check_delay(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && Duration::try_from_secs_f64(value).is_ok() {
        Ok(())
    } else {
        Err(ConfigError::InvalidDelay { name, value })
    }
}
