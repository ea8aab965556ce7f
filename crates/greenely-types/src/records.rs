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

//! Raw records as returned by the Greenely API.
//!
//! The provider answers with JSON objects keyed by opaque identifiers. Key order
//! is significant (it is the chronological order of the series), so responses are
//! held in a [`RecordSet`] that keeps document order instead of a sorted map.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Provider timestamp layout, e.g. `2025-10-02 13:00`
pub const LOCALTIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Records carrying a provider `localtime` string
pub trait Timestamped {
    fn localtime(&self) -> &str;
}

/// Ordered keyed collection of raw records
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet<T> {
    entries: Vec<(String, T)>,
}

impl<T> RecordSet<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a record; an existing key is overwritten in place
    pub fn insert(&mut self, key: impl Into<String>, record: T) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = record;
        } else {
            self.entries.push((key, record));
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in provider order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, record)| (k.as_str(), record))
    }

    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, record)| record)
    }
}

impl<T> Default for RecordSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for RecordSet<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut builder = RecordSetBuilder::with_capacity(iter.size_hint().0);
        for (key, record) in iter {
            builder.push(key.into(), record);
        }
        builder.finish()
    }
}

/// Appends in order and resolves a repeated key through an index instead of a scan
struct RecordSetBuilder<T> {
    positions: HashMap<String, usize>,
    entries: Vec<(String, T)>,
}

impl<T> RecordSetBuilder<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Last value wins, first position is kept
    fn push(&mut self, key: String, record: T) {
        if let Some(&position) = self.positions.get(&key) {
            if let Some(slot) = self.entries.get_mut(position) {
                slot.1 = record;
            }
            return;
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push((key, record));
    }

    fn finish(self) -> RecordSet<T> {
        RecordSet {
            entries: self.entries,
        }
    }
}

impl<T: Serialize> Serialize for RecordSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

struct RecordSetVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for RecordSetVisitor<T> {
    type Value = RecordSet<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object of records keyed by id")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut builder = RecordSetBuilder::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, record)) = access.next_entry::<String, T>()? {
            builder.push(key, record);
        }
        Ok(builder.finish())
    }

    // `null` and `[]` read as an empty set
    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(RecordSet::new())
    }

    fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
            return Err(serde::de::Error::custom(
                "expected an object of records, found a non-empty array",
            ));
        }
        Ok(RecordSet::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RecordSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordSetVisitor(PhantomData))
    }
}

/// Consumption sample, `usage` in Wh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub localtime: String,
    pub usage: Option<f64>,
}

impl UsageRecord {
    pub fn new(localtime: impl Into<String>, usage: Option<f64>) -> Self {
        Self {
            localtime: localtime.into(),
            usage,
        }
    }
}

/// Production sample, `value` in Wh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub localtime: String,
    pub value: Option<f64>,
}

impl ProductionRecord {
    pub fn new(localtime: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            localtime: localtime.into(),
            value,
        }
    }
}

/// Sold-electricity sample, `usage` in Wh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoldRecord {
    pub localtime: String,
    pub usage: Option<f64>,
    /// Settlement flag, passed through untouched
    #[serde(default)]
    pub is_complete: serde_json::Value,
}

impl SoldRecord {
    pub fn new(
        localtime: impl Into<String>,
        usage: Option<f64>,
        is_complete: serde_json::Value,
    ) -> Self {
        Self {
            localtime: localtime.into(),
            usage,
            is_complete,
        }
    }
}

/// Retail cost line of the current month, in provider currency sub-units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub cost: Option<f64>,
}

/// Spot price point, `price` in provider sub-units per kWh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotPriceRecord {
    pub localtime: String,
    pub price: Option<f64>,
}

impl SpotPriceRecord {
    pub fn new(localtime: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            localtime: localtime.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotPriceResponse {
    #[serde(default)]
    pub data: RecordSet<SpotPriceRecord>,
}

impl Timestamped for UsageRecord {
    fn localtime(&self) -> &str {
        &self.localtime
    }
}

impl Timestamped for ProductionRecord {
    fn localtime(&self) -> &str {
        &self.localtime
    }
}

impl Timestamped for SoldRecord {
    fn localtime(&self) -> &str {
        &self.localtime
    }
}

impl Timestamped for SpotPriceRecord {
    fn localtime(&self) -> &str {
        &self.localtime
    }
}
