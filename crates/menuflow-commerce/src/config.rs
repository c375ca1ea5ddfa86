//! Engine configuration.
//!
//! Tunables that the tenant API does not provide. Every field has a default,
//! so an empty file is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityCalculator;
use crate::cart::CartLimits;

/// Menu engine configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Heartbeat age (seconds) after which the tenant is presumed offline.
    pub heartbeat_tolerance_secs: u64,

    /// Width of a bookable delivery slot, in minutes.
    pub slot_interval_minutes: u32,

    /// How often availability is refreshed, in seconds.
    pub availability_poll_secs: u64,

    /// How often a placed order's status is refreshed, in seconds.
    pub order_status_poll_secs: u64,

    /// Maximum characters in a cart line observation.
    pub observation_max_chars: usize,

    /// Maximum units on a single cart line.
    pub max_quantity_per_line: u32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            heartbeat_tolerance_secs: 90,
            slot_interval_minutes: 30,
            availability_poll_secs: 40,
            order_status_poll_secs: 15,
            observation_max_chars: 140,
            max_quantity_per_line: 999,
        }
    }
}

impl MenuConfig {
    /// Load config from a file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))?
        };
        config.validate()?;

        tracing::debug!(path, ?config, "loaded menu config");
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.slot_interval_minutes == 0 || 1440 % self.slot_interval_minutes != 0 {
            anyhow::bail!(
                "slot_interval_minutes must divide a day evenly, got {}",
                self.slot_interval_minutes
            );
        }
        if self.max_quantity_per_line == 0 {
            anyhow::bail!("max_quantity_per_line must be at least 1");
        }
        Ok(())
    }

    /// Availability calculator using these tunables.
    pub fn availability(&self) -> AvailabilityCalculator {
        AvailabilityCalculator::new(
            chrono::Duration::seconds(self.heartbeat_tolerance_secs as i64),
            self.slot_interval_minutes,
        )
    }

    /// Cart limits using these tunables.
    pub fn cart_limits(&self) -> CartLimits {
        CartLimits {
            max_quantity_per_line: self.max_quantity_per_line,
            observation_max_chars: self.observation_max_chars,
        }
    }

    /// Availability polling interval.
    pub fn availability_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.availability_poll_secs)
    }

    /// Order status polling interval.
    pub fn order_status_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.order_status_poll_secs)
    }
}
