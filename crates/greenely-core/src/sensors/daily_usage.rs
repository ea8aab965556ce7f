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
use chrono::{Days, NaiveDateTime};
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
use crate::mapper::{ENERGY_UNIT, map_usage_or_production, wh_to_kwh};
use crate::traits::{Clock, GreenelyDataSource};

/// Daily consumption over the last `usage_days` days; state is yesterday's kWh
pub struct DailyUsageSensor {
    source: Arc<dyn GreenelyDataSource>,
    clock: Arc<dyn Clock>,
    usage_days: u32,
    date_format: String,
    snapshot: SensorSnapshot<UsageAttributes>,
}

impl DailyUsageSensor {
    pub fn new(
        source: Arc<dyn GreenelyDataSource>,
        clock: Arc<dyn Clock>,
        usage_days: u32,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            source,
            clock,
            usage_days,
            date_format: date_format.into(),
            snapshot: SensorSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &SensorSnapshot<UsageAttributes> {
        &self.snapshot
    }

    /// Commit a fetched response; yesterday's record (exact midnight) sets the state
    fn apply(&mut self, today: NaiveDateTime, response: &RecordSet<UsageRecord>) {
        let yesterday = today.checked_sub_days(Days::new(1));
        let mut data = Vec::with_capacity(response.len());
        let mut state = None;

        for record in response.records() {
            if yesterday.is_some() && record_timestamp(&record.localtime) == yesterday {
                state = Some(wh_to_kwh(record.usage));
            }
            data.push(map_usage_or_production(record, &self.date_format).into_usage());
        }

        // No record for yesterday keeps the previous state
        if let Some(state) = state {
            self.snapshot.state = state;
        }
        self.snapshot.attributes.data = Some(data);
    }
}

#[async_trait]
impl SensorEntity for DailyUsageSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::DailyUsage
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

        let today = self.clock.today();
        let start = days_before(today.date(), self.usage_days);
        debug!(
            "📊 [SENSOR] Fetching daily usage data {} to {}...",
            start,
            today.date()
        );

        let response = self
            .source
            .get_usage(start, today.date(), false)
            .await
            .map_err(|e| SensorError::fetch("daily usage", e))?;

        self.apply(today, &response);

        info!(
            "✅ [SENSOR] {}: {} daily records, state={}",
            self.name(),
            response.len(),
            self.snapshot.state
        );
        Ok(())
    }
}
