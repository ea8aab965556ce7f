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

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use greenely_types::{
    CostRecord, ProductionRecord, RecordSet, SoldRecord, SpotPriceResponse, UsageRecord,
};

// ============= Data Source Traits =============

/// Authenticated access to a Greenely account
///
/// Sensors only use this trait and never know about login, token refresh or
/// HTTP. One instance is shared by all sensors of an integration instance, so
/// implementations must tolerate a session refresh triggered by any of them.
#[async_trait]
pub trait GreenelyDataSource: Send + Sync {
    /// Make sure a valid session exists, logging in again if needed.
    /// `Ok(false)` and `Err` both mean the sensors must not fetch.
    async fn check_session(&self) -> Result<bool>;

    /// Consumption for `[start, end)` in Wh, daily or hourly
    async fn get_usage(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        hourly: bool,
    ) -> Result<RecordSet<UsageRecord>>;

    /// Production for `[start, end)` in Wh, daily or hourly
    async fn get_produced_electricity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        hourly: bool,
    ) -> Result<RecordSet<ProductionRecord>>;

    /// Sold electricity; `measure` and `daily` are forwarded untouched
    async fn get_sold(&self, measure: u32, daily: bool) -> Result<RecordSet<SoldRecord>>;

    /// Retail cost lines of the running month
    async fn get_price_data(&self) -> Result<RecordSet<CostRecord>>;

    /// Spot prices around today (yesterday to tomorrow)
    async fn get_spot_price(&self) -> Result<SpotPriceResponse>;

    /// Get data source name for logging
    fn name(&self) -> &str;
}

// ============= Time =============

/// Source of local wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Local midnight of the current day
    fn today(&self) -> NaiveDateTime {
        self.now().date().and_time(chrono::NaiveTime::MIN)
    }
}

/// Host local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
