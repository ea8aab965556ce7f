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

//! Attribute mapping: raw Greenely records to display points.
//!
//! Every sensor goes through these functions so unit conversion and rounding
//! stay identical across sensors. Missing readings become the integer `0` and an
//! unparseable `localtime` is shown as the raw provider text; neither aborts the
//! mapping of the remaining records.

use chrono::NaiveDateTime;
use greenely_types::display::float_repr;
use greenely_types::records::LOCALTIME_FORMAT;
use greenely_types::{
    EnergyPoint, PricePoint, ProductionRecord, SoldPoint, SoldRecord, SpotPriceRecord, StateValue,
    Timestamped, UsageRecord,
};
use std::fmt::Write;
use tracing::warn;

use crate::errors::{SensorError, SensorResult};

/// Price unit in standard mode
pub const PRICE_UNIT: &str = "SEK/kWh";
/// Price unit in HomeKit mode; HomeKit has no generic numeric sensor, so prices
/// are published as a temperature
pub const PRICE_UNIT_HOMEKIT: &str = "°C";
pub const ENERGY_UNIT: &str = "kWh";

/// A raw record with an energy reading in Wh
pub trait EnergyReading: Timestamped {
    fn watt_hours(&self) -> Option<f64>;
}

impl EnergyReading for UsageRecord {
    fn watt_hours(&self) -> Option<f64> {
        self.usage
    }
}

impl EnergyReading for ProductionRecord {
    fn watt_hours(&self) -> Option<f64> {
        self.value
    }
}

// ============= Primitives =============

/// Parse a provider `YYYY-MM-DD HH:MM` timestamp
pub fn parse_localtime(raw: &str) -> SensorResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, LOCALTIME_FORMAT).map_err(|e| SensorError::MappingFailure {
        localtime: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Format with a strftime pattern, falling back to the provider layout when the
/// pattern cannot be rendered
pub fn format_timestamp(timestamp: &NaiveDateTime, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", timestamp.format(pattern)).is_err() {
        return timestamp.format(LOCALTIME_FORMAT).to_string();
    }
    out
}

/// Round to `decimals` places from the exact binary value
///
/// Goes through correctly rounded decimal text, so a value stored just above or
/// below a decimal tie rounds the way its binary value dictates.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Wh to kWh, missing readings to `0`
pub fn wh_to_kwh(watt_hours: Option<f64>) -> StateValue {
    match watt_hours {
        Some(wh) => StateValue::Float(wh / 1000.0),
        None => StateValue::ZERO,
    }
}

/// Provider price sub-units to the displayed price
///
/// HomeKit mode yields a whole number, standard mode a value with at most four
/// decimals.
pub fn format_price(price: f64, homekit_compatible: bool) -> StateValue {
    if homekit_compatible {
        StateValue::Integer((price / 1000.0).round_ties_even() as i64)
    } else {
        StateValue::Float(round_to(price / 1000.0 / 100.0, 4))
    }
}

pub fn price_unit(homekit_compatible: bool) -> &'static str {
    if homekit_compatible {
        PRICE_UNIT_HOMEKIT
    } else {
        PRICE_UNIT
    }
}

/// Sum of the month's cost lines in whole currency units
pub fn month_cost(total_cost: f64) -> i64 {
    (total_cost / 100_000.0).round_ties_even() as i64
}

/// Sold kWh as text, or the integer `0` when nothing was sold
pub fn sold_kwh(watt_hours: f64) -> StateValue {
    if watt_hours == 0.0 {
        StateValue::ZERO
    } else {
        StateValue::Text(float_repr(watt_hours / 1000.0))
    }
}

fn format_or_raw(raw: &str, pattern: &str) -> String {
    match parse_localtime(raw) {
        Ok(timestamp) => format_timestamp(&timestamp, pattern),
        Err(e) => {
            warn!("⚠️ [SENSOR] {e}, showing raw text");
            raw.to_owned()
        }
    }
}

// ============= Record Mapping =============

/// Daily usage or production record
pub fn map_usage_or_production(raw: &impl EnergyReading, date_format: &str) -> EnergyPoint {
    EnergyPoint {
        localtime: format_or_raw(raw.localtime(), date_format),
        value: wh_to_kwh(raw.watt_hours()),
    }
}

/// Hourly record, `localtime` rendered as `<date> <time>`
pub fn map_hourly(raw: &impl EnergyReading, date_format: &str, time_format: &str) -> EnergyPoint {
    let localtime = match parse_localtime(raw.localtime()) {
        Ok(timestamp) => format!(
            "{} {}",
            format_timestamp(&timestamp, date_format),
            format_timestamp(&timestamp, time_format)
        ),
        Err(e) => {
            warn!("⚠️ [SENSOR] {e}, showing raw text");
            raw.localtime().to_owned()
        }
    };

    EnergyPoint {
        localtime,
        value: wh_to_kwh(raw.watt_hours()),
    }
}

/// Spot price record; a missing price maps to `0`
pub fn map_price(
    raw: &SpotPriceRecord,
    date_format: &str,
    time_format: &str,
    homekit_compatible: bool,
) -> PricePoint {
    let (date, time) = match parse_localtime(raw.localtime()) {
        Ok(timestamp) => (
            format_timestamp(&timestamp, date_format),
            format_timestamp(&timestamp, time_format),
        ),
        Err(e) => {
            warn!("⚠️ [PRICES] {e}, showing raw text");
            (raw.localtime().to_owned(), String::new())
        }
    };

    PricePoint {
        date,
        time,
        price: raw
            .price
            .map_or(StateValue::ZERO, |price| format_price(price, homekit_compatible)),
    }
}

/// Sold-electricity record
pub fn map_sold(raw: &SoldRecord, date_format: &str) -> SoldPoint {
    SoldPoint {
        date: format_or_raw(raw.localtime(), date_format),
        usage: sold_kwh(raw.usage.unwrap_or(0.0)),
        is_complete: raw.is_complete.clone(),
    }
}
