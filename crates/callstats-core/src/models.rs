use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{CallStatsError, Result};

/// Column names read by the aggregation engine.
pub mod columns {
    pub const DIRECTION: &str = "direction";
    pub const CATEGORY: &str = "category";
    pub const NAME: &str = "name";
    pub const DATE_STARTED: &str = "date_started";
    pub const TALK_DURATION: &str = "talk_duration";
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One parsed row of a call-log export, keyed by header name.
///
/// All values are kept as strings; coercion happens during aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`. A repeated column overwrites the earlier value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Value of `column`, or `None` when the header has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Value of `column`, or `""` when the header has no such column.
    pub fn field(&self, column: &str) -> &str {
        self.get(column).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

// ── Buckets ───────────────────────────────────────────────────────────────────

/// Per-person totals inside one day bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayStats {
    /// Number of filtered calls.
    pub calls: u32,
    /// Sum of valid `talk_duration` values, unrounded.
    pub minutes: f64,
}

impl DayStats {
    /// Count one call and add its talk time.
    pub fn add_call(&mut self, minutes: f64) {
        self.calls += 1;
        self.minutes += minutes;
    }
}

// ── Pivoted rows ──────────────────────────────────────────────────────────────

/// Ordered `(person, value)` cells of one pivoted row.
///
/// Only persons present in the row's bucket appear; there are no zero
/// placeholders for absent persons.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonValues<V> {
    entries: Vec<(String, V)>,
}

impl<V> PersonValues<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, person: impl Into<String>, value: V) {
        self.entries.push((person.into(), value));
    }

    pub fn get(&self, person: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(name, _)| name == person)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for PersonValues<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of a per-day table, e.g. `{date: "2024-01-02", Alice: 2}`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow<V> {
    /// Day key in `YYYY-MM-DD` form, as found in the export.
    pub date: String,
    pub values: PersonValues<V>,
}

/// One row of the per-hour table.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRow {
    /// Display label, e.g. `"2:00 PM"`.
    pub hour: String,
    /// Underlying 24-hour value, used for ordering.
    pub hour24: u8,
    pub values: PersonValues<u32>,
}

impl<V: Serialize> Serialize for DailyRow<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.values.len()))?;
        map.serialize_entry("date", &self.date)?;
        for (person, value) in self.values.iter() {
            map.serialize_entry(person, value)?;
        }
        map.end()
    }
}

impl Serialize for HourlyRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.values.len()))?;
        map.serialize_entry("hour", &self.hour)?;
        map.serialize_entry("hour24", &self.hour24)?;
        for (person, value) in self.values.iter() {
            map.serialize_entry(person, value)?;
        }
        map.end()
    }
}

// ── AggregationResult ─────────────────────────────────────────────────────────

/// A filtered call that could not be placed into the day/hour buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based position among the parsed data rows.
    pub row: usize,
    /// The offending `date_started` value.
    pub value: String,
    pub reason: String,
}

/// Everything the renderer needs: three tables sharing one person universe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Distinct caller names in first-seen order; the column order for every
    /// table.
    pub persons: Vec<String>,
    pub daily_calls: Vec<DailyRow<u32>>,
    /// Talk minutes rounded to 2 decimals.
    pub daily_minutes: Vec<DailyRow<f64>>,
    pub hourly_calls: Vec<HourlyRow>,
    /// Filtered calls that made it into the tables.
    pub rows_processed: usize,
    /// Filtered calls dropped because of a malformed `date_started`.
    pub skipped: Vec<SkippedRow>,
}

impl AggregationResult {
    /// `true` when no outbound call survived filtering.
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Fail with [`CallStatsError::MalformedTimestamp`] for the first skipped
    /// row, or return `self` unchanged when nothing was skipped.
    pub fn into_strict(self) -> Result<Self> {
        if let Some(first) = self.skipped.first() {
            return Err(CallStatsError::MalformedTimestamp {
                row: first.row,
                value: first.value.clone(),
            });
        }
        Ok(self)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
