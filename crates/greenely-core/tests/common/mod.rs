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

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use greenely_core::{FixedClock, GreenelyDataSource};
use greenely_types::{
    CostRecord, ProductionRecord, RecordSet, SoldRecord, SpotPriceRecord, SpotPriceResponse,
    UsageRecord,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Canned reply of one collaborator call; `Err` carries the message to fail with
pub type Reply<T> = Result<T, String>;

fn replay<T: Clone>(reply: &Mutex<Reply<T>>) -> Result<T> {
    reply.lock().unwrap().clone().map_err(|e| anyhow!(e))
}

/// In-memory data source with scripted replies and recorded calls
pub struct MockSource {
    pub session: Mutex<Reply<bool>>,
    pub usage: Mutex<Reply<RecordSet<UsageRecord>>>,
    pub production: Mutex<Reply<RecordSet<ProductionRecord>>>,
    pub sold: Mutex<Reply<RecordSet<SoldRecord>>>,
    pub cost: Mutex<Reply<RecordSet<CostRecord>>>,
    pub spot: Mutex<Reply<SpotPriceResponse>>,
    pub usage_calls: Mutex<Vec<(NaiveDate, NaiveDate, bool)>>,
    pub production_calls: Mutex<Vec<(NaiveDate, NaiveDate, bool)>>,
    pub sold_calls: Mutex<Vec<(u32, bool)>>,
    pub fetches: AtomicUsize,
}

impl Default for MockSource {
    fn default() -> Self {
        Self {
            session: Mutex::new(Ok(true)),
            usage: Mutex::new(Ok(RecordSet::new())),
            production: Mutex::new(Ok(RecordSet::new())),
            sold: Mutex::new(Ok(RecordSet::new())),
            cost: Mutex::new(Ok(RecordSet::new())),
            spot: Mutex::new(Ok(SpotPriceResponse::default())),
            usage_calls: Mutex::new(Vec::new()),
            production_calls: Mutex::new(Vec::new()),
            sold_calls: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }
}

impl MockSource {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_session(&self, reply: Reply<bool>) {
        *self.session.lock().unwrap() = reply;
    }

    pub fn set_usage(&self, reply: Reply<RecordSet<UsageRecord>>) {
        *self.usage.lock().unwrap() = reply;
    }

    pub fn set_production(&self, reply: Reply<RecordSet<ProductionRecord>>) {
        *self.production.lock().unwrap() = reply;
    }

    pub fn set_sold(&self, reply: Reply<RecordSet<SoldRecord>>) {
        *self.sold.lock().unwrap() = reply;
    }

    pub fn set_cost(&self, reply: Reply<RecordSet<CostRecord>>) {
        *self.cost.lock().unwrap() = reply;
    }

    pub fn set_spot(&self, reply: Reply<SpotPriceResponse>) {
        *self.spot.lock().unwrap() = reply;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GreenelyDataSource for MockSource {
    async fn check_session(&self) -> Result<bool> {
        replay(&self.session)
    }

    async fn get_usage(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        hourly: bool,
    ) -> Result<RecordSet<UsageRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.usage_calls.lock().unwrap().push((start, end, hourly));
        replay(&self.usage)
    }

    async fn get_produced_electricity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        hourly: bool,
    ) -> Result<RecordSet<ProductionRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.production_calls.lock().unwrap().push((start, end, hourly));
        replay(&self.production)
    }

    async fn get_sold(&self, measure: u32, daily: bool) -> Result<RecordSet<SoldRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.sold_calls.lock().unwrap().push((measure, daily));
        replay(&self.sold)
    }

    async fn get_price_data(&self) -> Result<RecordSet<CostRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        replay(&self.cost)
    }

    async fn get_spot_price(&self) -> Result<SpotPriceResponse> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        replay(&self.spot)
    }

    fn name(&self) -> &str {
        "MockSource"
    }
}

// ============= Fixtures =============

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn clock_at(now: NaiveDateTime) -> Arc<FixedClock> {
    Arc::new(FixedClock(now))
}

pub fn usage(entries: &[(&str, Option<f64>)]) -> RecordSet<UsageRecord> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (localtime, value))| (i.to_string(), UsageRecord::new(*localtime, *value)))
        .collect()
}

pub fn production(entries: &[(&str, Option<f64>)]) -> RecordSet<ProductionRecord> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (localtime, value))| (i.to_string(), ProductionRecord::new(*localtime, *value)))
        .collect()
}

pub fn spot(entries: &[(&str, Option<f64>)]) -> SpotPriceResponse {
    SpotPriceResponse {
        data: entries
            .iter()
            .enumerate()
            .map(|(i, (localtime, price))| (i.to_string(), SpotPriceRecord::new(*localtime, *price)))
            .collect(),
    }
}

pub fn costs(entries: &[Option<f64>]) -> RecordSet<CostRecord> {
    entries
        .iter()
        .enumerate()
        .map(|(i, cost)| (i.to_string(), CostRecord { cost: *cost }))
        .collect()
}

// ============= Log Capture =============

/// In-memory writer for a `tracing-subscriber` fmt layer
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route events of the current thread into a buffer until the guard drops
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
