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

use async_trait::async_trait;
use chrono::{Days, NaiveDateTime, Timelike};
use greenely_types::{
    RecordSet, SensorKind, SensorSnapshot, StateValue, UsageAttributes, UsageRecord,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    DEVICE_CLASS_ENERGY, SensorEntity, attribute_map, days_before, ensure_session,
    record_timestamp,
};
use crate::errors::{SensorError, SensorResult};
use crate::mapper::{ENERGY_UNIT, map_hourly, wh_to_kwh};
use crate::traits::{Clock, GreenelyDataSource};

/// Hourly consumption
///
/// The provider publishes hourly data with a delay, so the fetch window ends
/// today and starts `hourly_offset_days` back. The state is the reading of the
/// current hour one day ago.
pub struct HourlyUsageSensor {
    source: Arc<dyn GreenelyDataSource>,
    clock: Arc<dyn Clock>,
    hourly_offset_days: u32,
    date_format: String,
    time_format: String,
    snapshot: SensorSnapshot<UsageAttributes>,
}

impl HourlyUsageSensor {
    pub fn new(
        source: Arc<dyn GreenelyDataSource>,
        clock: Arc<dyn Clock>,
        hourly_offset_days: u32,
        date_format: impl Into<String>,
        time_format: impl Into<String>,
    ) -> Self {
        Self {
            source,
            clock,
            hourly_offset_days,
            date_format: date_format.into(),
            time_format: time_format.into(),
            snapshot: SensorSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &SensorSnapshot<UsageAttributes> {
        &self.snapshot
    }

    fn apply(&mut self, now: NaiveDateTime, response: &RecordSet<UsageRecord>) {
        let target = now.checked_sub_days(Days::new(1));
        let mut data = Vec::with_capacity(response.len());
        let mut state = None;

        for record in response.records() {
            let matches = match (record_timestamp(&record.localtime), target) {
                (Some(ts), Some(target)) => ts.date() == target.date() && ts.hour() == target.hour(),
                _ => false,
            };
            if matches {
                state = Some(wh_to_kwh(record.usage));
            }
            data.push(map_hourly(record, &self.date_format, &self.time_format).into_usage());
        }

        if let Some(state) = state {
            self.snapshot.state = state;
        }
        self.snapshot.attributes.data = Some(data);
    }
}

#[async_trait]
impl SensorEntity for HourlyUsageSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::HourlyUsage
    }

    fn unit_of_measurement(&self) -> &str {
        ENERGY_UNIT
    }

    fn device_class(&self) -> Option<&str> {
        Some(DEVICE_CLASS_ENERGY)
    }

    fn state(&self) -> &StateValue {
        &self.snapshot.state
    }

    fn extra_state_attributes(&self) -> Map<String, Value> {
        attribute_map(&self.snapshot.attributes)
    }

    async fn try_update(&mut self) -> SensorResult<()> {
        ensure_session(self.source.as_ref()).await?;

        let now = self.clock.now();
        let today = now.date();
        let start = days_before(today, self.hourly_offset_days);
        debug!("📊 [SENSOR] Fetching hourly usage data {} to {}...", start, today);

        let response = self
            .source
            .get_usage(start, today, true)
            .await
            .map_err(|e| SensorError::fetch("hourly usage", e))?;

        self.apply(now, &response);

        info!(
            "✅ [SENSOR] {}: {} hourly records, state={}",
            self.name(),
            response.len(),
            self.snapshot.state
        );
        Ok(())
    }
}
