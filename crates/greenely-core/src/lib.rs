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

//! Greenely sensors: poll an energy-provider account through a
//! [`GreenelyDataSource`] and expose usage, production, sold energy and spot
//! prices as read-only sensor entities.

pub mod errors;
pub mod mapper;
pub mod platform;
pub mod sensors;
pub mod traits;

// Re-export common types for convenience
pub use errors::{SensorError, SensorResult};
pub use platform::GreenelyPlatform;
pub use sensors::{
    DailyProductionSensor, DailyUsageSensor, HourlyUsageSensor, PricesSensor, SensorEntity,
    SoldSensor,
};
pub use traits::{Clock, FixedClock, GreenelyDataSource, SystemClock};
