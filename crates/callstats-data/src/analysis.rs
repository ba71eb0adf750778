//! Main analysis pipeline.
//!
//! Reads an export, parses it into records and aggregates the outbound calls,
//! returning an [`AnalysisResult`] ready for rendering.

use std::path::Path;
use std::time::Instant;

use callstats_core::error::Result;
use callstats_core::models::AggregationResult;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::CallAggregator;
use crate::parser::parse;
use crate::reader::read_export;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Data rows parsed from the export (header excluded).
    pub rows_parsed: usize,
    /// Outbound calls that made it into the tables.
    pub calls_processed: usize,
    /// Outbound calls dropped for a malformed `date_started`.
    pub rows_skipped: usize,
    /// Number of distinct callers.
    pub persons: usize,
    /// Wall-clock seconds spent reading the export.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent parsing and aggregating.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_export`] / [`analyze_text`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub aggregation: AggregationResult,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Read `path` and run the pipeline over its contents.
pub fn analyze_export(path: &Path) -> Result<AnalysisResult> {
    let load_start = Instant::now();
    let raw = read_export(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let result = run(&raw, load_time)?;
    info!(
        "Analysed {}: {} calls from {} rows, {} skipped",
        path.display(),
        result.metadata.calls_processed,
        result.metadata.rows_parsed,
        result.metadata.rows_skipped,
    );
    Ok(result)
}

/// Run the pipeline over export text already in memory.
///
/// Parse failures abort before any aggregation happens.
pub fn analyze_text(raw: &str) -> Result<AnalysisResult> {
    run(raw, 0.0)
}

// ── Private ───────────────────────────────────────────────────────────────────

fn run(raw: &str, load_time: f64) -> Result<AnalysisResult> {
    let transform_start = Instant::now();
    let records = parse(raw)?;
    let aggregation = CallAggregator::aggregate(&records);
    let transform_time = transform_start.elapsed().as_secs_f64();

    debug!(
        "Pipeline took {:.3}s load, {:.3}s transform",
        load_time, transform_time
    );

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_parsed: records.len(),
        calls_processed: aggregation.rows_processed,
        rows_skipped: aggregation.skipped.len(),
        persons: aggregation.persons.len(),
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    Ok(AnalysisResult {
        aggregation,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use callstats_core::error::CallStatsError;
    use tempfile::TempDir;

    const EXPORT: &str = "\
id,direction,category,name,date_started,talk_duration,notes
1,outbound,outgoing,Alice,2024-01-02 09:15:00,3.5,\"left voicemail, call back\"
2,inbound,incoming,Alice,2024-01-02 10:00:00,7,
3,outbound,outgoing,Bob,2024-01-03 14:20:00,abc,

4,outbound,outgoing,Alice,2024-01-02 14:00:00,2,
5,outbound,outgoing,Bob,2024-01-03,1,
";

    #[test]
    fn test_analyze_text_pipeline() {
        let result = analyze_text(EXPORT).unwrap();
        let agg = &result.aggregation;

        assert_eq!(agg.persons, vec!["Alice", "Bob"]);
        assert_eq!(agg.daily_calls.len(), 2);
        assert_eq!(agg.daily_calls[0].values.get("Alice"), Some(&2));
        assert_eq!(agg.daily_minutes[0].values.get("Alice"), Some(&5.5));
        assert_eq!(agg.daily_minutes[1].values.get("Bob"), Some(&0.0));
        let hours: Vec<u8> = agg.hourly_calls.iter().map(|r| r.hour24).collect();
        assert_eq!(hours, vec![9, 14]);
        assert_eq!(agg.hourly_calls[1].values.get("Bob"), Some(&1));

        assert_eq!(result.metadata.rows_parsed, 5);
        assert_eq!(result.metadata.calls_processed, 3);
        assert_eq!(result.metadata.rows_skipped, 1);
        assert_eq!(agg.skipped[0].row, 5);
        assert_eq!(result.metadata.persons, 2);
    }

    #[test]
    fn test_analyze_text_empty_input_fails() {
        assert!(matches!(
            analyze_text("\n\n"),
            Err(CallStatsError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_analyze_export_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calls.csv");
        std::fs::write(&path, EXPORT).unwrap();

        let result = analyze_export(&path).unwrap();
        assert_eq!(result.aggregation.rows_processed, 3);
        assert!(result.metadata.load_time_seconds >= 0.0);
    }

    #[test]
    fn test_analyze_export_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = analyze_export(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(CallStatsError::FileRead { .. })));
    }

    #[test]
    fn test_analysis_result_serializes_flat() {
        let result = analyze_text(EXPORT).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["persons"], serde_json::json!(["Alice", "Bob"]));
        assert_eq!(json["daily_calls"][0]["date"], "2024-01-02");
        assert_eq!(json["hourly_calls"][0]["hour"], "9:00 AM");
        assert_eq!(json["metadata"]["rows_skipped"], 1);
    }
}
