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
use chrono::{Datelike, Days, NaiveDateTime, Timelike};
use greenely_types::{
    CostRecord, PriceAttributes, PricePoint, RecordSet, SensorKind, SensorSnapshot,
    SpotPriceResponse, StateValue,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{SensorEntity, attribute_map, ensure_session};
use crate::errors::{SensorError, SensorResult};
use crate::mapper::{map_price, month_cost, parse_localtime, price_unit};
use crate::traits::{Clock, GreenelyDataSource};

/// Spot prices for yesterday, today and tomorrow plus the running month's cost
///
/// State is the price of the current hour. Cost and spot data are fetched
/// independently; a failure of one never discards the other.
pub struct PricesSensor {
    source: Arc<dyn GreenelyDataSource>,
    clock: Arc<dyn Clock>,
    date_format: String,
    time_format: String,
    homekit_compatible: bool,
    snapshot: SensorSnapshot<PriceAttributes>,
}

/// Spot prices split by local calendar day
#[derive(Debug, Default)]
struct DayBuckets {
    previous_day: Vec<PricePoint>,
    current_day: Vec<PricePoint>,
    next_day: Vec<PricePoint>,
    current_price: Option<StateValue>,
}

impl PricesSensor {
    pub fn new(
        source: Arc<dyn GreenelyDataSource>,
        clock: Arc<dyn Clock>,
        date_format: impl Into<String>,
        time_format: impl Into<String>,
        homekit_compatible: bool,
    ) -> Self {
        Self {
            source,
            clock,
            date_format: date_format.into(),
            time_format: time_format.into(),
            homekit_compatible,
            snapshot: SensorSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &SensorSnapshot<PriceAttributes> {
        &self.snapshot
    }

    async fn refresh_month_cost(&mut self) -> SensorResult<()> {
        debug!("💰 [PRICES] Fetching month cost...");
        let response = self
            .source
            .get_price_data()
            .await
            .map_err(|e| SensorError::fetch("month cost", e))?;

        if let Some(cost) = Self::month_total(&response) {
            self.snapshot.attributes.current_month = Some(cost);
            debug!("💰 [PRICES] Current month cost: {}", cost);
        } else {
            warn!("⚠️ [PRICES] Empty cost response, keeping previous month cost");
        }
        Ok(())
    }

    async fn refresh_spot_prices(&mut self) -> SensorResult<()> {
        debug!("💰 [PRICES] Fetching spot prices...");
        let response = self
            .source
            .get_spot_price()
            .await
            .map_err(|e| SensorError::fetch("spot prices", e))?;

        self.apply_spot_prices(self.clock.now(), &response);
        Ok(())
    }

    /// `None` for an empty response
    fn month_total(response: &RecordSet<CostRecord>) -> Option<i64> {
        if response.is_empty() {
            return None;
        }
        let total: f64 = response.records().filter_map(|record| record.cost).sum();
        Some(month_cost(total))
    }

    fn bucket(&self, now: NaiveDateTime, response: &SpotPriceResponse) -> DayBuckets {
        let today = now.date();
        let yesterday = today.checked_sub_days(Days::new(1));
        let tomorrow = today.checked_add_days(Days::new(1));
        let mut buckets = DayBuckets::default();

        for record in response.data.records() {
            if record.price.is_none() {
                continue;
            }
            let timestamp = match parse_localtime(&record.localtime) {
                Ok(timestamp) => timestamp,
                Err(e) => {
                    warn!("⚠️ [PRICES] Skipping spot price: {}", e);
                    continue;
                }
            };

            let point = map_price(
                record,
                &self.date_format,
                &self.time_format,
                self.homekit_compatible,
            );
            let day = Some(timestamp.date());
            if day == Some(today) {
                buckets.current_day.push(point.clone());
            } else if day == yesterday {
                buckets.previous_day.push(point.clone());
            } else if day == tomorrow {
                buckets.next_day.push(point.clone());
            } else {
                continue;
            }

            if timestamp.hour() == now.hour() && timestamp.day() == now.day() {
                buckets.current_price = Some(point.price);
            }
        }

        buckets
    }

    fn apply_spot_prices(&mut self, now: NaiveDateTime, response: &SpotPriceResponse) {
        let buckets = self.bucket(now, response);
        info!(
            "💰 [PRICES] Spot prices: {} yesterday, {} today, {} tomorrow",
            buckets.previous_day.len(),
            buckets.current_day.len(),
            buckets.next_day.len()
        );

        if let Some(price) = buckets.current_price {
            self.snapshot.state = price;
        } else {
            debug!("💰 [PRICES] No price for the current hour, keeping previous state");
        }

        let attributes = &mut self.snapshot.attributes;
        attributes.previous_day = Some(buckets.previous_day);
        attributes.current_day = Some(buckets.current_day);
        attributes.next_day = Some(buckets.next_day);
    }
}

#[async_trait]
impl SensorEntity for PricesSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Prices
    }

    fn unit_of_measurement(&self) -> &str {
        price_unit(self.homekit_compatible)
    }

    fn state(&self) -> &StateValue {
        &self.snapshot.state
    }

    fn extra_state_attributes(&self) -> Map<String, Value> {
        attribute_map(&self.snapshot.attributes)
    }

    async fn try_update(&mut self) -> SensorResult<()> {
        ensure_session(self.source.as_ref()).await?;

        let cost = self.refresh_month_cost().await;
        let spot = self.refresh_spot_prices().await;

        match (cost, spot) {
            (Err(cost), Err(spot)) => {
                error!("❌ [PRICES] {}: {}", self.name(), cost);
                Err(spot)
            }
            (cost, spot) => cost.and(spot),
        }
    }
}
