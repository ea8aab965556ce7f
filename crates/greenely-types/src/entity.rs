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

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::display::{PricePoint, ProductionPoint, SoldPoint, StateValue, UsagePoint};

pub const STATE_CLASS_MEASUREMENT: &str = "measurement";
pub const LAST_RESET_EPOCH: &str = "1970-01-01T00:00:00+00:00";

// ============= Sensor Kinds =============

/// The sensors the integration can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    DailyUsage,
    HourlyUsage,
    DailyProduction,
    Sold,
    Prices,
}

impl SensorKind {
    /// Entity name shown in the frontend
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DailyUsage => "Greenely Daily Usage",
            Self::HourlyUsage => "Greenely Hourly Usage",
            Self::DailyProduction => "Greenely Daily Production",
            Self::Sold => "Greenely Sold",
            Self::Prices => "Greenely Prices",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::DailyUsage | Self::HourlyUsage | Self::DailyProduction => "mdi:power-socket-eu",
            Self::Sold => "mdi:solar-power",
            Self::Prices => "mdi:account-cash",
        }
    }

    /// Config key of the enable flag
    pub fn to_config_value(&self) -> &'static str {
        match self {
            Self::DailyUsage => "daily_usage",
            Self::HourlyUsage => "hourly_usage",
            Self::DailyProduction => "daily_production",
            Self::Sold => "sold",
            Self::Prices => "prices",
        }
    }

    /// All kinds, in setup order
    pub fn all() -> &'static [SensorKind] {
        &[
            Self::DailyUsage,
            Self::HourlyUsage,
            Self::DailyProduction,
            Self::Sold,
            Self::Prices,
        ]
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for SensorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.to_config_value() == s.to_lowercase())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown sensor kind: '{}'. Supported kinds: {}",
                    s,
                    Self::all()
                        .iter()
                        .map(SensorKind::to_config_value)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

// ============= Snapshots =============

/// Last-known-good output of one sensor: scalar state plus attribute bag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot<A> {
    pub state: StateValue,
    pub attributes: A,
}

impl<A: Default> Default for SensorSnapshot<A> {
    fn default() -> Self {
        Self {
            state: StateValue::ZERO,
            attributes: A::default(),
        }
    }
}

/// Attribute bag of the usage and production sensors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyAttributes<P> {
    pub state_class: String,
    pub last_reset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<P>>,
}

impl<P> Default for EnergyAttributes<P> {
    fn default() -> Self {
        Self {
            state_class: STATE_CLASS_MEASUREMENT.to_owned(),
            last_reset: LAST_RESET_EPOCH.to_owned(),
            data: None,
        }
    }
}

pub type UsageAttributes = EnergyAttributes<UsagePoint>;
pub type ProductionAttributes = EnergyAttributes<ProductionPoint>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SoldAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_data: Option<Vec<SoldPoint>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceAttributes {
    /// Cost of the running month, whole currency units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_month: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_day: Option<Vec<PricePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_day: Option<Vec<PricePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_day: Option<Vec<PricePoint>>,
}

// ============= Exported State =============

/// Entity state in the shape the home-automation host stores it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: StateValue,
    pub attributes: Map<String, Value>,
}

/// `sensor.<slug>` id for an entity name, e.g. `sensor.greenely_daily_usage`
pub fn entity_id_for(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    format!("sensor.{slug}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sensor_kind_round_trip_through_config_value() {
        for kind in SensorKind::all() {
            let parsed: SensorKind = kind.to_config_value().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert!("weekly_usage".parse::<SensorKind>().is_err());
    }

    #[test]
    fn test_entity_id_slug() {
        assert_eq!(
            entity_id_for("Greenely Daily Usage"),
            "sensor.greenely_daily_usage"
        );
        assert_eq!(entity_id_for("  Prices (SEK) "), "sensor.prices_sek");
    }

    #[test]
    fn test_initial_energy_snapshot_has_no_data_key() {
        let snapshot: SensorSnapshot<UsageAttributes> = SensorSnapshot::default();
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(
            value,
            json!({
                "state": 0,
                "attributes": {
                    "state_class": "measurement",
                    "last_reset": "1970-01-01T00:00:00+00:00"
                }
            })
        );
    }

    #[test]
    fn test_empty_price_attributes_serialize_to_empty_object() {
        let value = serde_json::to_value(PriceAttributes::default()).unwrap();
        assert_eq!(value, json!({}));
    }
}
