//! Configuration file support for vitals.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vitals/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub ecg: EcgConfig,

    #[serde(default)]
    pub workload: WorkloadConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// ECG beat detection parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EcgConfig {
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Minimum time between two beats, in seconds
    #[serde(default = "default_min_peak_distance_s")]
    pub min_peak_distance_s: f64,

    /// Minimum peak prominence, in amplitude units
    #[serde(default = "default_min_prominence")]
    pub min_prominence: f64,
}

impl Default for EcgConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate_hz(),
            min_peak_distance_s: default_min_peak_distance_s(),
            min_prominence: default_min_prominence(),
        }
    }
}

impl EcgConfig {
    /// Same detection parameters at a different sampling rate
    pub fn with_sample_rate(&self, sample_rate_hz: f64) -> Self {
        Self {
            sample_rate_hz,
            ..self.clone()
        }
    }
}

/// Longest trailing window accepted for the workload ratio (ten years)
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Trailing windows for the acute:chronic workload ratio
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkloadConfig {
    #[serde(default = "default_acute_days")]
    pub acute_days: u32,

    #[serde(default = "default_chronic_days")]
    pub chronic_days: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            acute_days: default_acute_days(),
            chronic_days: default_chronic_days(),
        }
    }
}

impl WorkloadConfig {
    /// Acute must be a non-empty span strictly shorter than chronic
    pub fn validate(&self) -> Result<()> {
        if self.acute_days == 0 {
            return Err(Error::Config("acute_days must be at least 1".into()));
        }
        if self.acute_days >= self.chronic_days {
            return Err(Error::Config(format!(
                "acute_days ({}) must be shorter than chronic_days ({})",
                self.acute_days, self.chronic_days
            )));
        }
        if self.chronic_days > MAX_WINDOW_DAYS {
            return Err(Error::Config(format!(
                "chronic_days ({}) must be at most {}",
                self.chronic_days, MAX_WINDOW_DAYS
            )));
        }
        Ok(())
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("vitals")
}

fn default_sample_rate_hz() -> f64 {
    250.0
}

fn default_min_peak_distance_s() -> f64 {
    0.4
}

fn default_min_prominence() -> f64 {
    0.3
}

fn default_acute_days() -> u32 {
    7
}

fn default_chronic_days() -> u32 {
    28
}

fn positive_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("vitals").join("config.toml")
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        positive_finite("ecg.sample_rate_hz", self.ecg.sample_rate_hz)?;
        positive_finite("ecg.min_peak_distance_s", self.ecg.min_peak_distance_s)?;
        positive_finite("ecg.min_prominence", self.ecg.min_prominence)?;
        self.workload.validate()
    }
}
