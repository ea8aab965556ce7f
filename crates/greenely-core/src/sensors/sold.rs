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
use greenely_types::{
    RecordSet, SensorKind, SensorSnapshot, SoldAttributes, SoldRecord, StateValue,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{SensorEntity, attribute_map, ensure_session};
use crate::errors::{SensorError, SensorResult};
use crate::mapper::{ENERGY_UNIT, map_sold, sold_kwh};
use crate::traits::GreenelyDataSource;

/// Electricity sold back to the grid; state is the total over the response
pub struct SoldSensor {
    source: Arc<dyn GreenelyDataSource>,
    sold_measure: u32,
    sold_daily: bool,
    date_format: String,
    snapshot: SensorSnapshot<SoldAttributes>,
}

impl SoldSensor {
    pub fn new(
        source: Arc<dyn GreenelyDataSource>,
        sold_measure: u32,
        sold_daily: bool,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            source,
            sold_measure,
            sold_daily,
            date_format: date_format.into(),
            snapshot: SensorSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &SensorSnapshot<SoldAttributes> {
        &self.snapshot
    }

    fn apply(&mut self, response: &RecordSet<SoldRecord>) {
        let mut total = 0.0;
        let mut sold_data = Vec::with_capacity(response.len());

        for record in response.records() {
            total += record.usage.unwrap_or(0.0);
            sold_data.push(map_sold(record, &self.date_format));
        }

        self.snapshot.state = sold_kwh(total);
        self.snapshot.attributes.sold_data = Some(sold_data);
    }
}

#[async_trait]
impl SensorEntity for SoldSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Sold
    }

    fn unit_of_measurement(&self) -> &str {
        ENERGY_UNIT
    }

    fn state(&self) -> &StateValue {
        &self.snapshot.state
    }

    fn extra_state_attributes(&self) -> Map<String, Value> {
        attribute_map(&self.snapshot.attributes)
    }

    async fn try_update(&mut self) -> SensorResult<()> {
        ensure_session(self.source.as_ref()).await?;

        debug!(
            "📊 [SENSOR] Fetching sold data (measure={}, daily={})...",
            self.sold_measure, self.sold_daily
        );
        let response = self
            .source
            .get_sold(self.sold_measure, self.sold_daily)
            .await
            .map_err(|e| SensorError::fetch("sold electricity", e))?;

        if response.is_empty() {
            warn!("⚠️ [SENSOR] {}: empty response, keeping previous data", self.name());
            return Ok(());
        }

        self.apply(&response);

        info!(
            "✅ [SENSOR] {}: {} sold records, total={}",
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
    use crate::sensors::testing::source;
    use serde_json::json;

    fn sensor() -> SoldSensor {
        SoldSensor::new(source(), 2, false, "%b %d %Y")
    }

    #[test]
    fn test_total_is_sum_of_raw_usage() {
        let mut sensor = sensor();
        let response: RecordSet<SoldRecord> = [
            ("1", SoldRecord::new("2025-08-01 00:00", Some(1_200.0), json!(true))),
            ("2", SoldRecord::new("2025-09-01 00:00", None, json!(true))),
            ("3", SoldRecord::new("2025-10-01 00:00", Some(300.0), json!(false))),
        ]
        .into_iter()
        .collect();

        sensor.apply(&response);

        assert_eq!(sensor.state(), &StateValue::Text("1.5".to_owned()));
        let sold = sensor.snapshot().attributes.sold_data.as_ref().unwrap();
        assert_eq!(sold.len(), 3);
        assert_eq!(sold[1].usage, StateValue::ZERO);
        assert_eq!(sold[2].is_complete, json!(false));
    }

    #[test]
    fn test_nothing_sold_is_numeric_zero() {
        let mut sensor = sensor();
        let response: RecordSet<SoldRecord> =
            [("1", SoldRecord::new("2025-10-01 00:00", Some(0.0), json!(false)))]
                .into_iter()
                .collect();

        sensor.apply(&response);

        assert_eq!(sensor.state(), &StateValue::ZERO);
        assert_eq!(sensor.entity_state().state, StateValue::ZERO);
    }

    #[test]
    fn test_descriptor() {
        let sensor = sensor();
        assert_eq!(sensor.name(), "Greenely Sold");
        assert_eq!(sensor.icon(), "mdi:solar-power");
        assert_eq!(sensor.unit_of_measurement(), "kWh");
        assert_eq!(sensor.device_class(), None);
        assert!(sensor.extra_state_attributes().is_empty());
    }
}
