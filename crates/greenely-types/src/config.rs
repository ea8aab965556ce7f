// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Greenely Sensors.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entity::SensorKind;

/// Integration configuration, fixed for the lifetime of the instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenelyConfig {
    /// Greenely account email
    pub email: String,

    /// Greenely account password
    pub password: String,

    /// Facility to read; `primary` lets the API pick the account's main facility
    #[serde(default = "default_facility_id")]
    pub facility_id: String,

    // ============= Sensor Toggles =============
    #[serde(default = "default_true")]
    pub daily_usage: bool,

    #[serde(default)]
    pub hourly_usage: bool,

    #[serde(default)]
    pub daily_production: bool,

    #[serde(default)]
    pub sold: bool,

    #[serde(default = "default_true")]
    pub prices: bool,

    // ============= Lookback Windows =============
    /// Days of daily usage history to fetch
    #[serde(default = "default_days")]
    pub usage_days: u32,

    /// Days of daily production history to fetch, today included
    #[serde(default = "default_days")]
    pub production_days: u32,

    /// Days of hourly usage history to fetch
    #[serde(default = "default_hourly_offset_days")]
    pub hourly_offset_days: u32,

    /// Granularity selector forwarded to the sold-electricity endpoint
    #[serde(default = "default_sold_measure")]
    pub sold_measure: u32,

    #[serde(default)]
    pub sold_daily: bool,

    // ============= Presentation =============
    /// strftime pattern for dates in attributes
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// strftime pattern for times in attributes
    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// Report prices as whole numbers in `°C` so HomeKit bridges accept them
    #[serde(default)]
    pub homekit_compatible: bool,

    /// Polling interval the host scheduler should use (seconds)
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_facility_id() -> String {
    "primary".to_owned()
}

fn default_days() -> u32 {
    10
}

fn default_hourly_offset_days() -> u32 {
    1
}

fn default_sold_measure() -> u32 {
    2
}

fn default_date_format() -> String {
    "%b %d %Y".to_owned()
}

fn default_time_format() -> String {
    "%H:%M".to_owned()
}

fn default_scan_interval_secs() -> u64 {
    3600
}

impl GreenelyConfig {
    /// Configuration with every option at its default
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            facility_id: default_facility_id(),
            daily_usage: true,
            hourly_usage: false,
            daily_production: false,
            sold: false,
            prices: true,
            usage_days: default_days(),
            production_days: default_days(),
            hourly_offset_days: default_hourly_offset_days(),
            sold_measure: default_sold_measure(),
            sold_daily: false,
            date_format: default_date_format(),
            time_format: default_time_format(),
            homekit_compatible: false,
            scan_interval_secs: default_scan_interval_secs(),
        }
    }

    /// Load from a `.json` or `.toml` file (anything but `.json` is read as TOML)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        info!("✅ [CONFIG] Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents).context("Failed to parse JSON config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            anyhow::bail!("email cannot be empty");
        }
        if self.password.is_empty() {
            anyhow::bail!("password cannot be empty");
        }
        if self.facility_id.trim().is_empty() {
            anyhow::bail!("facility_id cannot be empty");
        }

        for (key, value) in [
            ("usage_days", self.usage_days),
            ("production_days", self.production_days),
            ("hourly_offset_days", self.hourly_offset_days),
            ("sold_measure", self.sold_measure),
        ] {
            if value == 0 {
                anyhow::bail!("{key} must be a positive integer");
            }
        }
        if self.scan_interval_secs == 0 {
            anyhow::bail!("scan_interval_secs must be a positive integer");
        }

        validate_pattern("date_format", &self.date_format)?;
        validate_pattern("time_format", &self.time_format)?;

        Ok(())
    }

    /// Enabled sensors, in setup order
    pub fn enabled_sensors(&self) -> Vec<SensorKind> {
        SensorKind::all()
            .iter()
            .copied()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    pub fn is_enabled(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::DailyUsage => self.daily_usage,
            SensorKind::HourlyUsage => self.hourly_usage,
            SensorKind::DailyProduction => self.daily_production,
            SensorKind::Sold => self.sold,
            SensorKind::Prices => self.prices,
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

fn validate_pattern(key: &str, pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        anyhow::bail!("{key} cannot be empty");
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        anyhow::bail!("{key} '{pattern}' is not a valid strftime pattern");
    }
    Ok(())
}
