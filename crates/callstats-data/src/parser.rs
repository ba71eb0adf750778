//! Comma-separated call-log parsing.
//!
//! Turns raw export text into [`Record`]s keyed by the header row. Only plain
//! commas and double quotes are understood; values are never coerced.

use callstats_core::error::{CallStatsError, Result};
use callstats_core::models::Record;
use tracing::debug;

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse a whole export into records, one per non-blank data line.
///
/// Lines that are empty or whitespace-only are dropped wherever they occur.
/// The first surviving line is the header. Fails with
/// [`CallStatsError::MalformedInput`] when there is no header.
pub fn parse(raw: &str) -> Result<Vec<Record>> {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| CallStatsError::MalformedInput("input has no header row".to_string()))?;
    let parser = RecordParser::from_header(header)?;

    let records: Vec<Record> = lines.map(|line| parser.parse_line(line)).collect();

    debug!(
        "Parsed {} records with {} columns",
        records.len(),
        parser.headers().len()
    );

    Ok(records)
}

/// Split one data line into trimmed field values.
///
/// A `"` toggles quoted mode and is dropped; a `,` outside quotes ends the
/// field; anything else, including a quoted comma, is kept. Doubled quotes
/// (`""`) are not unescaped: they toggle twice and vanish.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut within_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => within_quotes = !within_quotes,
            ',' if !within_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    values.push(current.trim().to_string());

    values
}

// ── RecordParser ──────────────────────────────────────────────────────────────

/// Header-bound line parser.
///
/// Each data line is parsed independently, so callers holding the text in
/// chunks can feed lines as they arrive.
#[derive(Debug, Clone)]
pub struct RecordParser {
    headers: Vec<String>,
}

impl RecordParser {
    /// Build a parser from the header line. Headers are split on every comma
    /// with no quote handling and are not trimmed.
    pub fn from_header(line: &str) -> Result<Self> {
        if line.trim().is_empty() {
            return Err(CallStatsError::MalformedInput(
                "header row is empty".to_string(),
            ));
        }
        Ok(Self {
            headers: line.split(',').map(str::to_string).collect(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Zip the line's values with the headers. Missing trailing values become
    /// `""`; values beyond the last header are dropped.
    pub fn parse_line(&self, line: &str) -> Record {
        let mut values = tokenize_line(line).into_iter();
        self.headers
            .iter()
            .map(|header| (header.clone(), values.next().unwrap_or_default()))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
