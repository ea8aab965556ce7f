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

use serde::Serialize;
use std::fmt;

// ============= State Values =============

/// Scalar exposed as an entity state or inside a display point
///
/// Consumers of the sensors depend on the JSON typing, so integers, floats and
/// strings are kept apart: a missing reading is the integer `0`, a converted
/// reading is a float, and the sold totals are strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl StateValue {
    /// The integer zero used for missing readings and empty totals
    pub const ZERO: StateValue = StateValue::Integer(0);
}

impl Default for StateValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&float_repr(*v)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip decimal text of a float, always with a fractional part
/// (`5.0`, `0.0015`, `12.3`)
///
/// Magnitudes below `1e-4` or from `1e16` up switch to exponent form with a
/// signed, at least two-digit exponent (`1e-05`, `2.5e+16`).
pub fn float_repr(value: f64) -> String {
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

// ============= Display Points =============

/// Converted energy reading before it is attached to a sensor attribute
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyPoint {
    /// Formatted local date (daily) or date and time (hourly)
    pub localtime: String,
    /// kWh, or the integer `0` when the provider had no reading
    pub value: StateValue,
}

impl EnergyPoint {
    pub fn into_usage(self) -> UsagePoint {
        UsagePoint {
            localtime: self.localtime,
            usage: self.value,
        }
    }

    pub fn into_production(self) -> ProductionPoint {
        ProductionPoint {
            localtime: self.localtime,
            production: self.value,
        }
    }
}

/// One entry of the usage sensors' `data` attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsagePoint {
    pub localtime: String,
    pub usage: StateValue,
}

/// One entry of the production sensor's `data` attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionPoint {
    pub localtime: String,
    pub production: StateValue,
}

/// One entry of the sold sensor's `sold_data` attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoldPoint {
    pub date: String,
    /// kWh as text when non-zero, integer `0` otherwise
    pub usage: StateValue,
    pub is_complete: serde_json::Value,
}

/// One entry of the prices sensor's day buckets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: String,
    pub time: String,
    pub price: StateValue,
}
