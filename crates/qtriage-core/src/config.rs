//! Runtime configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! [classification]
//! min_symptom_chars = 5
//! debounce_ms = 1200
//! timeout_ms = 15000
//!
//! [capacity]
//! volume_threshold = 10
//! strain_threshold = 5
//! base_staff = 10
//! shortage_retained_percent = 60
//! critical_load_ratio = 5.0
//! minutes_per_patient = 12
//!
//! [storage]
//! database_path = "clinic.sqlite3"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    pub classification: ClassificationConfig,
    pub capacity: CapacityConfig,
    pub storage: StorageConfig,
}

/// Classification gateway settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Inputs shorter than this stay `Pending`
    pub min_symptom_chars: usize,
    /// Quiet period before a typed input is classified
    pub debounce_ms: u64,
    /// Upper bound on one model call
    pub timeout_ms: u64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            min_symptom_chars: 5,
            debounce_ms: 1200,
            timeout_ms: 15_000,
        }
    }
}

impl ClassificationConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Capacity monitor thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Total count at which the clinic is volume overloaded
    pub volume_threshold: u32,
    /// EMERGENCY + CRITICAL count at which resources are strained
    pub strain_threshold: u32,
    /// Staff on duty without a shortage
    pub base_staff: u32,
    /// Share of staff still on duty during a shortage
    pub shortage_retained_percent: u32,
    /// Patients per active staff member above which load is critical
    pub critical_load_ratio: f64,
    /// Wait-time estimate per queued patient
    pub minutes_per_patient: u32,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            volume_threshold: 10,
            strain_threshold: 5,
            base_staff: 10,
            shortage_retained_percent: 60,
            critical_load_ratio: 5.0,
            minutes_per_patient: 12,
        }
    }
}

/// Durable store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("clinic.sqlite3"),
        }
    }
}

impl ClinicConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: ClinicConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Reject values the monitor and gateway cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        let capacity = &self.capacity;
        if capacity.volume_threshold == 0 {
            return Err(invalid("capacity.volume_threshold", "must be at least 1"));
        }
        if capacity.strain_threshold == 0 {
            return Err(invalid("capacity.strain_threshold", "must be at least 1"));
        }
        if capacity.shortage_retained_percent > 100 {
            return Err(invalid(
                "capacity.shortage_retained_percent",
                "must be between 0 and 100",
            ));
        }
        if !(capacity.critical_load_ratio.is_finite() && capacity.critical_load_ratio > 0.0) {
            return Err(invalid(
                "capacity.critical_load_ratio",
                "must be a positive number",
            ));
        }
        if self.classification.timeout_ms == 0 {
            return Err(invalid("classification.timeout_ms", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
