//! Correlation and chart configuration
//!
//! Loaded from an optional TOML file; every field has a default.
//!
//! ```toml
//! cdf_fraction = 0.96
//! bar_fraction = 0.90
//! pending_max_age = 5000
//! warn_on_negative_delay = true
//! ```

use crate::error::DelayError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings shared by the correlator and the chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Cumulative probability at which the CDF series stops
    #[serde(default = "default_cdf_fraction")]
    pub cdf_fraction: f64,

    /// Share of occurrences covered before the bar series stops
    #[serde(default = "default_bar_fraction")]
    pub bar_fraction: f64,

    /// Evict pending SOCKADDR entries older than this many lines
    ///
    /// Unset by default: pending entries are kept until EOF.
    pub pending_max_age: Option<u64>,

    /// Log a warning whenever a packet precedes its SOCKADDR record
    #[serde(default = "default_warn_on_negative_delay")]
    pub warn_on_negative_delay: bool,
}

fn default_cdf_fraction() -> f64 {
    0.96
}

fn default_bar_fraction() -> f64 {
    0.90
}

fn default_warn_on_negative_delay() -> bool {
    true
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            cdf_fraction: default_cdf_fraction(),
            bar_fraction: default_bar_fraction(),
            pending_max_age: None,
            warn_on_negative_delay: default_warn_on_negative_delay(),
        }
    }
}

impl DelayConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), DelayError> {
        validate_fraction(self.cdf_fraction)?;
        validate_fraction(self.bar_fraction)?;

        if self.pending_max_age == Some(0) {
            return Err(DelayError::Config(
                "pending_max_age must be at least 1 line".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check that a coverage fraction lies in (0, 1]
pub fn validate_fraction(fraction: f64) -> std::result::Result<(), DelayError> {
    if fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        Err(DelayError::InvalidFraction(fraction))
    }
}
