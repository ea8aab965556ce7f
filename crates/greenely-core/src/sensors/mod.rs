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

mod daily_production;
mod daily_usage;
mod hourly_usage;
mod prices;
mod sold;

pub use daily_production::DailyProductionSensor;
pub use daily_usage::DailyUsageSensor;
pub use hourly_usage::HourlyUsageSensor;
pub use prices::PricesSensor;
pub use sold::SoldSensor;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime};
use greenely_types::entity::entity_id_for;
use greenely_types::{EntityState, SensorKind, StateValue};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::errors::{SensorError, SensorResult};
use crate::mapper::parse_localtime;
use crate::traits::GreenelyDataSource;

/// Device class of the usage and production sensors
pub const DEVICE_CLASS_ENERGY: &str = "energy";

/// A read-only entity polled by the host platform
///
/// The host calls [`SensorEntity::update`] on its own schedule and reads the
/// state and attributes afterwards. A failed update never clears anything: the
/// sensor keeps reporting its last successful snapshot.
#[async_trait]
pub trait SensorEntity: Send + Sync {
    fn kind(&self) -> SensorKind;

    fn name(&self) -> &str {
        self.kind().display_name()
    }

    fn icon(&self) -> &str {
        self.kind().icon()
    }

    fn unit_of_measurement(&self) -> &str;

    fn device_class(&self) -> Option<&str> {
        None
    }

    fn state(&self) -> &StateValue;

    fn extra_state_attributes(&self) -> Map<String, Value>;

    /// One poll cycle: check the session, fetch, map, commit
    async fn try_update(&mut self) -> SensorResult<()>;

    /// Poll and swallow errors; the previous snapshot is retained on failure
    async fn update(&mut self) {
        match self.try_update().await {
            Ok(()) => {}
            Err(SensorError::AuthenticationFailure) => {
                error!("❌ [SENSOR] {}: Unable to log in!", self.name());
            }
            Err(e) => {
                error!("❌ [SENSOR] {}: {}", self.name(), e);
            }
        }
    }

    /// State object as the host stores it
    fn entity_state(&self) -> EntityState {
        let mut attributes = self.extra_state_attributes();
        attributes.insert(
            "unit_of_measurement".to_owned(),
            Value::from(self.unit_of_measurement()),
        );
        attributes.insert("friendly_name".to_owned(), Value::from(self.name()));
        attributes.insert("icon".to_owned(), Value::from(self.icon()));
        if let Some(device_class) = self.device_class() {
            attributes.insert("device_class".to_owned(), Value::from(device_class));
        }

        EntityState {
            entity_id: entity_id_for(self.name()),
            state: self.state().clone(),
            attributes,
        }
    }
}

/// Fail with `AuthenticationFailure` unless the data source has a valid session
pub(crate) async fn ensure_session(source: &dyn GreenelyDataSource) -> SensorResult<()> {
    debug!("🔐 [SENSOR] Checking session validity via {}...", source.name());
    match source.check_session().await {
        Ok(true) => Ok(()),
        Ok(false) => Err(SensorError::AuthenticationFailure),
        Err(e) => {
            warn!("⚠️ [SENSOR] Session check failed: {e:#}");
            Err(SensorError::AuthenticationFailure)
        }
    }
}

/// Parsed timestamp of a record, `None` when it cannot take part in matching
pub(crate) fn record_timestamp(localtime: &str) -> Option<NaiveDateTime> {
    parse_localtime(localtime).ok()
}

pub(crate) fn days_before(day: NaiveDate, days: u32) -> NaiveDate {
    day.checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

pub(crate) fn days_after(day: NaiveDate, days: u32) -> NaiveDate {
    day.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

pub(crate) fn attribute_map<A: Serialize>(attributes: &A) -> Map<String, Value> {
    match serde_json::to_value(attributes) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use greenely_types::{
        CostRecord, ProductionRecord, RecordSet, SoldRecord, SpotPriceResponse, UsageRecord,
    };
    use std::sync::Arc;

    use crate::traits::{Clock, FixedClock, GreenelyDataSource};

    /// Source that is never reached by the tests using it
    pub struct Unreachable;

    #[async_trait]
    impl GreenelyDataSource for Unreachable {
        async fn check_session(&self) -> Result<bool> {
            Ok(false)
        }

        async fn get_usage(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
            _hourly: bool,
        ) -> Result<RecordSet<UsageRecord>> {
            bail!("unreachable")
        }

        async fn get_produced_electricity(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
            _hourly: bool,
        ) -> Result<RecordSet<ProductionRecord>> {
            bail!("unreachable")
        }

        async fn get_sold(&self, _measure: u32, _daily: bool) -> Result<RecordSet<SoldRecord>> {
            bail!("unreachable")
        }

        async fn get_price_data(&self) -> Result<RecordSet<CostRecord>> {
            bail!("unreachable")
        }

        async fn get_spot_price(&self) -> Result<SpotPriceResponse> {
            bail!("unreachable")
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    pub fn source() -> Arc<dyn GreenelyDataSource> {
        Arc::new(Unreachable)
    }

    pub fn clock(now: NaiveDateTime) -> Arc<dyn Clock> {
        Arc::new(FixedClock(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_arithmetic_saturates() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        assert_eq!(days_before(day, 1), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(days_after(day, 1), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert_eq!(days_before(day, u32::MAX), NaiveDate::MIN);
    }

    #[test]
    fn test_attribute_map_of_non_object_is_empty() {
        assert!(attribute_map(&42).is_empty());
        assert_eq!(
            attribute_map(&serde_json::json!({"a": 1})).get("a"),
            Some(&Value::from(1))
        );
    }
}
