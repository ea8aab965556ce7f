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
use chrono::NaiveDateTime;
use greenely_types::{
    ProductionAttributes, ProductionRecord, RecordSet, SensorKind, SensorSnapshot, StateValue,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    DEVICE_CLASS_ENERGY, SensorEntity, attribute_map, days_after, days_before, ensure_session,
    record_timestamp,
};
use crate::errors::{SensorError, SensorResult};
use crate::mapper::{ENERGY_UNIT, map_usage_or_production, wh_to_kwh};
use crate::traits::{Clock, GreenelyDataSource};

/// Daily solar production; the window includes today and the state is today's reading
pub struct DailyProductionSensor {
    source: Arc<dyn GreenelyDataSource>,
    clock: Arc<dyn Clock>,
    production_days: u32,
    date_format: String,
    snapshot: SensorSnapshot<ProductionAttributes>,
}

impl DailyProductionSensor {
    pub fn new(
        source: Arc<dyn GreenelyDataSource>,
        clock: Arc<dyn Clock>,
        production_days: u32,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            source,
            clock,
            production_days,
            date_format: date_format.into(),
            snapshot: SensorSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &SensorSnapshot<ProductionAttributes> {
        &self.snapshot
    }

    fn apply(&mut self, today: NaiveDateTime, response: &RecordSet<ProductionRecord>) {
        let mut data = Vec::with_capacity(response.len());
        let mut state = None;

        for record in response.records() {
            if record_timestamp(&record.localtime) == Some(today) {
                state = Some(wh_to_kwh(record.value));
            }
            data.push(map_usage_or_production(record, &self.date_format).into_production());
        }

        if let Some(state) = state {
            self.snapshot.state = state;
        }
        self.snapshot.attributes.data = Some(data);
    }
}

#[async_trait]
impl SensorEntity for DailyProductionSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::DailyProduction
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
        let start = days_before(today.date(), self.production_days.saturating_sub(1));
        let end = days_after(today.date(), 1);
        debug!("☀️ [SENSOR] Fetching production data {} to {}...", start, end);

        let response = self
            .source
            .get_produced_electricity(start, end, false)
            .await
            .map_err(|e| SensorError::fetch("daily production", e))?;

        self.apply(today, &response);

        info!(
            "✅ [SENSOR] {}: {} production records, state={}",
            self.name(),
            response.len(),
            self.snapshot.state
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::testing::{at, clock, source};
    use greenely_types::ProductionPoint;

    fn sensor() -> DailyProductionSensor {
        DailyProductionSensor::new(source(), clock(at(2025, 6, 15, 18, 0)), 10, "%Y-%m-%d")
    }

    #[test]
    fn test_today_sets_state() {
        let mut sensor = sensor();
        let response: RecordSet<ProductionRecord> = [
            ("1", ProductionRecord::new("2025-06-14 00:00", Some(21_000.0))),
            ("2", ProductionRecord::new("2025-06-15 00:00", Some(12_340.0))),
        ]
        .into_iter()
        .collect();

        sensor.apply(at(2025, 6, 15, 0, 0), &response);

        assert_eq!(sensor.state(), &StateValue::Float(12.34));
        assert_eq!(
            sensor.snapshot().attributes.data.as_ref().unwrap()[0],
            ProductionPoint {
                localtime: "2025-06-14".to_owned(),
                production: StateValue::Float(21.0),
            }
        );
    }

    #[test]
    fn test_empty_response_clears_data_and_keeps_state() {
        let mut sensor = sensor();
        sensor.snapshot.state = StateValue::Float(4.0);

        sensor.apply(at(2025, 6, 15, 0, 0), &RecordSet::new());

        assert_eq!(sensor.state(), &StateValue::Float(4.0));
        assert_eq!(sensor.snapshot().attributes.data, Some(Vec::new()));
    }

    #[test]
    fn test_attributes_use_production_key() {
        let mut sensor = sensor();
        let response: RecordSet<ProductionRecord> =
            [("1", ProductionRecord::new("2025-06-15 00:00", None))]
                .into_iter()
                .collect();
        sensor.apply(at(2025, 6, 15, 0, 0), &response);

        let attributes = sensor.extra_state_attributes();
        assert_eq!(
            attributes.get("data"),
            Some(&serde_json::json!([{"localtime": "2025-06-15", "production": 0}]))
        );
        assert_eq!(attributes.get("state_class"), Some(&Value::from("measurement")));
        assert_eq!(sensor.name(), "Greenely Daily Production");
        assert_eq!(sensor.device_class(), Some("energy"));
    }
}
