//! Outbound call aggregation by day and by hour of day.
//!
//! Works in two stages: filtered calls are grouped into
//! `key -> person -> totals` maps, then each group is flattened into one
//! pivoted row with a cell per person present.

use std::collections::{BTreeMap, HashMap, HashSet};

use callstats_core::formatting::{format_hour_label, round_to};
use callstats_core::models::{
    columns, AggregationResult, DailyRow, DayStats, HourlyRow, PersonValues, Record, SkippedRow,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Day key → person → call count and talk minutes. Keys iterate in ascending
/// string order.
pub type DayGroups = BTreeMap<String, HashMap<String, DayStats>>;

/// Hour (0-23) → person → call count.
pub type HourGroups = BTreeMap<u8, HashMap<String, u32>>;

// ── Timestamp keys ────────────────────────────────────────────────────────────

/// Why a `date_started` value could not be split into day and hour keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimestampIssue {
    #[error("no space between date and time")]
    MissingTime,
    #[error("empty date")]
    EmptyDate,
    #[error("no ':' after the hour")]
    MissingColon,
    #[error("hour is not a number")]
    NonNumericHour,
    #[error("hour is outside 0-23")]
    HourOutOfRange,
}

/// Day key: everything before the first space.
pub fn parse_day_key(date_started: &str) -> Result<&str, TimestampIssue> {
    let (date, _) = date_started
        .split_once(' ')
        .ok_or(TimestampIssue::MissingTime)?;
    if date.is_empty() {
        return Err(TimestampIssue::EmptyDate);
    }
    Ok(date)
}

/// Hour key: the digits between the first space and the following colon.
pub fn parse_hour_key(date_started: &str) -> Result<u8, TimestampIssue> {
    let (_, time) = date_started
        .split_once(' ')
        .ok_or(TimestampIssue::MissingTime)?;
    let (hour, _) = time.split_once(':').ok_or(TimestampIssue::MissingColon)?;

    if hour.is_empty() || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampIssue::NonNumericHour);
    }
    match hour.parse::<u8>() {
        Ok(h) if h <= 23 => Ok(h),
        _ => Err(TimestampIssue::HourOutOfRange),
    }
}

/// Talk minutes from a `talk_duration` cell.
///
/// Reads the longest leading decimal number, so `"3.5 min"` is `3.5`.
/// Cells with no leading number count as zero.
pub fn parse_duration(raw: &str) -> f64 {
    let text = raw.trim();
    text[..numeric_prefix_len(text)]
        .parse::<f64>()
        .ok()
        .filter(|minutes| minutes.is_finite())
        .unwrap_or(0.0)
}

/// Byte length of `[+-]digits[.digits][(e|E)[+-]digits]` at the start of
/// `text`, or 0 when the mantissa has no digit.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    end
}

// ── KeyedCall ─────────────────────────────────────────────────────────────────

/// A filtered call with its bucket keys already derived.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedCall<'a> {
    pub person: &'a str,
    pub date: &'a str,
    pub hour: u8,
    pub minutes: f64,
}

impl<'a> KeyedCall<'a> {
    /// Derive both keys from `record`, failing on a malformed `date_started`.
    pub fn from_record(record: &'a Record) -> Result<Self, TimestampIssue> {
        let date_started = record.field(columns::DATE_STARTED);
        Ok(Self {
            person: record.field(columns::NAME),
            date: parse_day_key(date_started)?,
            hour: parse_hour_key(date_started)?,
            minutes: parse_duration(record.field(columns::TALK_DURATION)),
        })
    }
}

// ── CallAggregator ────────────────────────────────────────────────────────────

/// Stateless helper that turns parsed records into the three call tables.
pub struct CallAggregator;

impl CallAggregator {
    /// Run the full pipeline: filter, collect persons, group, pivot.
    ///
    /// Filtered calls with a malformed `date_started` are left out of every
    /// table and listed in [`AggregationResult::skipped`].
    pub fn aggregate(records: &[Record]) -> AggregationResult {
        let calls = Self::filter_calls(records);
        let persons = Self::collect_persons(calls.iter().map(|(_, record)| *record));
        let (keyed, skipped) = Self::resolve_keys(&calls);

        let day_groups = Self::group_by_day(&keyed);
        let hour_groups = Self::group_by_hour(&keyed);

        debug!(
            "Aggregated {} records: {} calls, {} skipped, {} days, {} hours, {} persons",
            records.len(),
            keyed.len(),
            skipped.len(),
            day_groups.len(),
            hour_groups.len(),
            persons.len(),
        );

        AggregationResult {
            daily_calls: Self::pivot_daily_calls(&day_groups, &persons),
            daily_minutes: Self::pivot_daily_minutes(&day_groups, &persons),
            hourly_calls: Self::pivot_hourly_calls(&hour_groups, &persons),
            rows_processed: keyed.len(),
            skipped,
            persons,
        }
    }

    /// `true` for outbound calls in the outgoing category. Exact match.
    pub fn is_outbound_call(record: &Record) -> bool {
        record.field(columns::DIRECTION) == "outbound"
            && record.field(columns::CATEGORY) == "outgoing"
    }

    /// Keep outbound calls, paired with their 1-based data row number.
    pub fn filter_calls(records: &[Record]) -> Vec<(usize, &Record)> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| Self::is_outbound_call(record))
            .map(|(index, record)| (index + 1, record))
            .collect()
    }

    /// Distinct `name` values in first-seen order.
    pub fn collect_persons<'a>(calls: impl IntoIterator<Item = &'a Record>) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut persons = Vec::new();
        for record in calls {
            let name = record.field(columns::NAME);
            if seen.insert(name) {
                persons.push(name.to_string());
            }
        }
        persons
    }

    /// Derive day and hour keys for every call, splitting off the ones whose
    /// timestamp does not have the `date HH:MM` shape.
    pub fn resolve_keys<'a>(
        calls: &[(usize, &'a Record)],
    ) -> (Vec<KeyedCall<'a>>, Vec<SkippedRow>) {
        let mut keyed = Vec::with_capacity(calls.len());
        let mut skipped = Vec::new();

        for &(row, record) in calls {
            match KeyedCall::from_record(record) {
                Ok(call) => keyed.push(call),
                Err(issue) => {
                    let value = record.field(columns::DATE_STARTED);
                    warn!("Skipping row {}: malformed date_started {:?} ({})", row, value, issue);
                    skipped.push(SkippedRow {
                        row,
                        value: value.to_string(),
                        reason: issue.to_string(),
                    });
                }
            }
        }

        (keyed, skipped)
    }

    /// Group calls by day, accumulating per-person counts and minutes.
    pub fn group_by_day(calls: &[KeyedCall<'_>]) -> DayGroups {
        let mut groups = DayGroups::new();
        for call in calls {
            groups
                .entry(call.date.to_string())
                .or_default()
                .entry(call.person.to_string())
                .or_default()
                .add_call(call.minutes);
        }
        groups
    }

    /// Group calls by hour of day, counting per person.
    pub fn group_by_hour(calls: &[KeyedCall<'_>]) -> HourGroups {
        let mut groups = HourGroups::new();
        for call in calls {
            *groups
                .entry(call.hour)
                .or_default()
                .entry(call.person.to_string())
                .or_insert(0) += 1;
        }
        groups
    }

    /// One row per day with each present person's call count.
    pub fn pivot_daily_calls(groups: &DayGroups, persons: &[String]) -> Vec<DailyRow<u32>> {
        groups
            .iter()
            .map(|(date, bucket)| DailyRow {
                date: date.clone(),
                values: pivot(bucket, persons, |stats| stats.calls),
            })
            .collect()
    }

    /// One row per day with each present person's talk minutes, rounded to
    /// 2 decimals.
    pub fn pivot_daily_minutes(groups: &DayGroups, persons: &[String]) -> Vec<DailyRow<f64>> {
        groups
            .iter()
            .map(|(date, bucket)| DailyRow {
                date: date.clone(),
                values: pivot(bucket, persons, |stats| round_to(stats.minutes, 2)),
            })
            .collect()
    }

    /// One row per hour present in the data, ordered by the 24-hour value.
    pub fn pivot_hourly_calls(groups: &HourGroups, persons: &[String]) -> Vec<HourlyRow> {
        groups
            .iter()
            .map(|(&hour, bucket)| HourlyRow {
                hour: format_hour_label(hour),
                hour24: hour,
                values: pivot(bucket, persons, |count| *count),
            })
            .collect()
    }
}

// ── Private ───────────────────────────────────────────────────────────────────

/// Project `bucket` onto `persons`, skipping persons the bucket lacks.
fn pivot<T, V>(
    bucket: &HashMap<String, T>,
    persons: &[String],
    value: impl Fn(&T) -> V,
) -> PersonValues<V> {
    let mut values = PersonValues::new();
    for person in persons {
        if let Some(totals) = bucket.get(person) {
            values.push(person.clone(), value(totals));
        }
    }
    values
}

// ── Tests ─────────────────────────────────────────────────────────────────────
