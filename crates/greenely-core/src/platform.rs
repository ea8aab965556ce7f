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

use greenely_types::{EntityState, GreenelyConfig, SensorKind};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::sensors::{
    DailyProductionSensor, DailyUsageSensor, HourlyUsageSensor, PricesSensor, SensorEntity,
    SoldSensor,
};
use crate::traits::{Clock, GreenelyDataSource};

/// The set of Greenely sensors of one configured account
///
/// All sensors share one data source, so a session refresh triggered by one of
/// them is seen by the others.
pub struct GreenelyPlatform {
    sensors: Vec<Box<dyn SensorEntity>>,
}

impl GreenelyPlatform {
    /// Build one sensor per enabled kind, in setup order
    pub fn setup(
        config: &GreenelyConfig,
        source: Arc<dyn GreenelyDataSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            "🔌 [PLATFORM] Setting up Greenely sensors for facility '{}' via {}",
            config.facility_id,
            source.name()
        );

        let mut sensors: Vec<Box<dyn SensorEntity>> = Vec::new();
        for kind in config.enabled_sensors() {
            let sensor: Box<dyn SensorEntity> = match kind {
                SensorKind::DailyUsage => Box::new(DailyUsageSensor::new(
                    Arc::clone(&source),
                    Arc::clone(&clock),
                    config.usage_days,
                    config.date_format.as_str(),
                )),
                SensorKind::HourlyUsage => Box::new(HourlyUsageSensor::new(
                    Arc::clone(&source),
                    Arc::clone(&clock),
                    config.hourly_offset_days,
                    config.date_format.as_str(),
                    config.time_format.as_str(),
                )),
                SensorKind::DailyProduction => Box::new(DailyProductionSensor::new(
                    Arc::clone(&source),
                    Arc::clone(&clock),
                    config.production_days,
                    config.date_format.as_str(),
                )),
                SensorKind::Sold => Box::new(SoldSensor::new(
                    Arc::clone(&source),
                    config.sold_measure,
                    config.sold_daily,
                    config.date_format.as_str(),
                )),
                SensorKind::Prices => Box::new(PricesSensor::new(
                    Arc::clone(&source),
                    Arc::clone(&clock),
                    config.date_format.as_str(),
                    config.time_format.as_str(),
                    config.homekit_compatible,
                )),
            };
            debug!("🔌 [PLATFORM] Added {}", sensor.name());
            sensors.push(sensor);
        }

        if sensors.is_empty() {
            warn!("⚠️ [PLATFORM] No Greenely sensors enabled");
        } else {
            let names: Vec<&str> = sensors.iter().map(|s| s.name()).collect();
            info!(
                "✅ [PLATFORM] {} sensor(s) ready: {}",
                sensors.len(),
                names.join(", ")
            );
        }

        Self { sensors }
    }

    pub fn with_sensors(sensors: Vec<Box<dyn SensorEntity>>) -> Self {
        Self { sensors }
    }

    pub fn sensors(&self) -> &[Box<dyn SensorEntity>] {
        &self.sensors
    }

    pub fn sensor(&self, kind: SensorKind) -> Option<&dyn SensorEntity> {
        self.sensors
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Poll every sensor once, one after another
    pub async fn update_all(&mut self) {
        for sensor in &mut self.sensors {
            sensor.update().await;
        }
    }

    pub fn entity_states(&self) -> Vec<EntityState> {
        self.sensors.iter().map(|s| s.entity_state()).collect()
    }
}

impl fmt::Debug for GreenelyPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenelyPlatform")
            .field(
                "sensors",
                &self.sensors.iter().map(|s| s.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
