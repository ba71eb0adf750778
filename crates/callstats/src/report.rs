//! Plain-text and JSON rendering of the call tables.
//!
//! The text form is a summary grid: one row per person in person-set order,
//! one column per day or hour, and a trailing `Avg` column. A cell is blank
//! wherever the person made no call in that period or the value is zero.

use callstats_core::formatting::{format_date_label, format_value};
use callstats_core::models::AggregationResult;
use callstats_data::analysis::AnalysisResult;
use unicode_width::UnicodeWidthStr;

/// A titled grid of already-formatted cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub title: String,
    /// `"Name"`, one label per period, then `"Avg"`.
    pub headers: Vec<String>,
    /// One row per person: name, one cell per period, average per period.
    pub rows: Vec<Vec<String>>,
}

impl SummaryTable {
    /// Calls per person per day, with `MM/DD` column labels.
    pub fn daily_calls(result: &AggregationResult) -> Self {
        Self::build(
            "Outbound Calls per Day",
            &result.persons,
            &result.daily_calls,
            |row| format_date_label(&row.date),
            |row, person| row.values.get(person).map(|calls| f64::from(*calls)),
        )
    }

    /// Talk minutes per person per day.
    pub fn daily_minutes(result: &AggregationResult) -> Self {
        Self::build(
            "Outbound Call Minutes per Day",
            &result.persons,
            &result.daily_minutes,
            |row| format_date_label(&row.date),
            |row, person| row.values.get(person).copied(),
        )
    }

    /// Calls per person per hour of day, with 12-hour column labels.
    pub fn hourly_calls(result: &AggregationResult) -> Self {
        Self::build(
            "Outbound Calls per Hour",
            &result.persons,
            &result.hourly_calls,
            |row| row.hour.clone(),
            |row, person| row.values.get(person).map(|calls| f64::from(*calls)),
        )
    }

    fn build<R>(
        title: &str,
        persons: &[String],
        periods: &[R],
        label: impl Fn(&R) -> String,
        value: impl Fn(&R, &str) -> Option<f64>,
    ) -> Self {
        let headers: Vec<String> = std::iter::once("Name".to_string())
            .chain(periods.iter().map(&label))
            .chain(std::iter::once("Avg".to_string()))
            .collect();

        let rows = persons
            .iter()
            .map(|person| {
                let values: Vec<Option<f64>> = periods
                    .iter()
                    .map(|period| value(period, person.as_str()))
                    .collect();
                std::iter::once(person.clone())
                    .chain(values.iter().map(|v| format_cell(*v)))
                    .chain(std::iter::once(format_average(&values)))
                    .collect::<Vec<String>>()
            })
            .collect();

        Self {
            title: title.to_string(),
            headers,
            rows,
        }
    }

    /// Render as aligned text: title, header, separator, one line per person.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut lines = vec![self.title.clone()];
        lines.push(format_line(&self.headers, &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &self.rows {
            lines.push(format_line(row, &widths));
        }

        lines.join("\n")
    }
}

/// Render every table `shows` accepts, followed by the processing summary.
pub fn render_text(result: &AggregationResult, shows: impl Fn(&str) -> bool) -> String {
    let mut sections = Vec::new();

    if result.is_empty() {
        sections.push("No outbound calls found.".to_string());
    } else {
        if shows("calls") {
            sections.push(SummaryTable::daily_calls(result).render());
        }
        if shows("minutes") {
            sections.push(SummaryTable::daily_minutes(result).render());
        }
        if shows("hourly") {
            sections.push(SummaryTable::hourly_calls(result).render());
        }
    }
    sections.push(render_footer(result));

    sections.join("\n\n")
}

/// Counts of processed and skipped calls, plus one line per skipped row.
pub fn render_footer(result: &AggregationResult) -> String {
    let mut lines = vec![format!(
        "{} calls processed, {} skipped",
        result.rows_processed,
        result.skipped.len()
    )];
    for skip in &result.skipped {
        lines.push(format!(
            "  row {}: {:?} ({})",
            skip.row, skip.value, skip.reason
        ));
    }
    lines.join("\n")
}

/// Pretty-printed JSON of the tables, person set and run metadata.
pub fn to_json(analysis: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Blank for absent and zero values.
fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format_value(v),
        _ => String::new(),
    }
}

/// Mean over every period, absent cells counting as zero, two decimals.
fn format_average(values: &[Option<f64>]) -> String {
    if values.is_empty() {
        return "0".to_string();
    }
    let total: f64 = values.iter().map(|v| v.unwrap_or(0.0)).sum();
    format!("{:.2}", total / values.len() as f64)
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Left-align `cell` in `width` display columns.
fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.width());
    format!("{}{}", cell, " ".repeat(fill))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use callstats_data::aggregator::CallAggregator;
    use callstats_data::analysis::analyze_text;
    use callstats_data::parser::parse;

    const EXPORT: &str = "\
direction,category,name,date_started,talk_duration
outbound,outgoing,Alice,2024-01-02 09:15:00,3.5
outbound,outgoing,Bob,2024-01-03 14:00:00,2
outbound,outgoing,Alice,2024-01-03 14:30:00,1.25
outbound,outgoing,Zoë,2024-01-03 09:00:00,
outbound,outgoing,Bob,bad-timestamp,1
";

    fn result() -> AggregationResult {
        CallAggregator::aggregate(&parse(EXPORT).unwrap())
    }

    // ── SummaryTable ──────────────────────────────────────────────────────────

    #[test]
    fn test_daily_calls_grid_shape() {
        let table = SummaryTable::daily_calls(&result());

        assert_eq!(table.headers, vec!["Name", "01/02", "01/03", "Avg"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec!["Alice", "1", "1", "1.00"]);
        assert_eq!(table.rows[1], vec!["Bob", "", "1", "0.50"]);
        assert_eq!(table.rows[2], vec!["Zoë", "", "1", "0.50"]);
    }

    #[test]
    fn test_daily_minutes_grid_values() {
        let table = SummaryTable::daily_minutes(&result());
        assert_eq!(&table.rows[0][..3], &["Alice", "3.5", "1.25"]);
        assert_eq!(table.rows[1], vec!["Bob", "", "2", "1.00"]);
    }

    #[test]
    fn test_daily_minutes_zero_value_renders_blank() {
        let table = SummaryTable::daily_minutes(&result());
        assert_eq!(table.rows[2], vec!["Zoë", "", "", "0.00"]);
    }

    #[test]
    fn test_hourly_grid_uses_labels_in_hour_order() {
        let table = SummaryTable::hourly_calls(&result());
        assert_eq!(table.headers, vec!["Name", "9:00 AM", "2:00 PM", "Avg"]);
        assert_eq!(table.rows[1], vec!["Bob", "", "1", "0.50"]);
    }

    #[test]
    fn test_average_without_periods() {
        assert_eq!(format_average(&[]), "0");
        assert_eq!(format_average(&[Some(2.0), None, Some(1.0)]), "1.00");
    }

    #[test]
    fn test_render_aligns_columns() {
        let table = SummaryTable::daily_calls(&result());
        let text = table.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Outbound Calls per Day");
        assert_eq!(lines[1], "Name  | 01/02 | 01/03 | Avg");
        assert_eq!(lines[2], "------+-------+-------+-----");
        assert_eq!(lines[3], "Alice | 1     | 1     | 1.00");
        assert_eq!(lines[4], "Bob   |       | 1     | 0.50");
        assert_eq!(lines[5], "Zoë   |       | 1     | 0.50");
    }

    // ── render_text ───────────────────────────────────────────────────────────

    #[test]
    fn test_render_text_single_view() {
        let text = render_text(&result(), |view| view == "hourly");
        assert!(text.contains("Outbound Calls per Hour"));
        assert!(!text.contains("Outbound Calls per Day"));
        assert!(text.contains("4 calls processed, 1 skipped"));
    }

    #[test]
    fn test_render_text_empty_result() {
        let text = render_text(&AggregationResult::default(), |_| true);
        assert!(text.starts_with("No outbound calls found."));
        assert!(text.ends_with("0 calls processed, 0 skipped"));
    }

    #[test]
    fn test_render_footer_lists_skips() {
        let footer = render_footer(&result());
        assert!(footer.contains("row 5: \"bad-timestamp\" (no space between date and time)"));
    }

    // ── to_json ───────────────────────────────────────────────────────────────

    #[test]
    fn test_to_json_contains_tables() {
        let analysis = analyze_text(EXPORT).unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&analysis).unwrap()).unwrap();

        assert_eq!(json["persons"], serde_json::json!(["Alice", "Bob", "Zoë"]));
        assert_eq!(json["daily_minutes"][1]["Alice"], serde_json::json!(1.25));
        assert_eq!(json["hourly_calls"][1]["hour24"], 14);
        assert_eq!(json["skipped"][0]["row"], 5);
    }
}
