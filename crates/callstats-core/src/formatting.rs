/// Format a 24-hour value as a 12-hour clock label.
///
/// `hour` must be in `0..=23`; hour keys from the aggregator always are.
///
/// # Examples
///
/// ```
/// use callstats_core::formatting::format_hour_label;
///
/// assert_eq!(format_hour_label(0), "12:00 AM");
/// assert_eq!(format_hour_label(9), "9:00 AM");
/// assert_eq!(format_hour_label(12), "12:00 PM");
/// assert_eq!(format_hour_label(23), "11:00 PM");
/// ```
pub fn format_hour_label(hour: u8) -> String {
    debug_assert!(hour <= 23, "hour out of range: {}", hour);
    match hour {
        0 => "12:00 AM".to_string(),
        1..=11 => format!("{}:00 AM", hour),
        12 => "12:00 PM".to_string(),
        _ => format!("{}:00 PM", hour - 12),
    }
}

/// Shorten a `YYYY-MM-DD` day key to `MM/DD` for table headers.
///
/// Every dash-separated segment after the first is kept and joined with `/`.
/// Keys without a dash are returned unchanged.
///
/// # Examples
///
/// ```
/// use callstats_core::formatting::format_date_label;
///
/// assert_eq!(format_date_label("2024-01-02"), "01/02");
/// assert_eq!(format_date_label("today"), "today");
/// ```
pub fn format_date_label(date: &str) -> String {
    let mut segments = date.split('-');
    segments.next();
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        date.to_string()
    } else {
        rest.join("/")
    }
}

/// Round `value` to `decimals` places.
///
/// Rounds the exact binary value through its decimal form, so `2.675`
/// (stored as `2.67499...`) becomes `2.67`.
///
/// # Examples
///
/// ```
/// use callstats_core::formatting::round_to;
///
/// assert_eq!(round_to(1.236, 2), 1.24);
/// assert_eq!(round_to(2.675, 2), 2.67);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Shortest display form of a table value: `2`, `5.5`, `0.25`.
///
/// # Examples
///
/// ```
/// use callstats_core::formatting::format_value;
///
/// assert_eq!(format_value(2.0), "2");
/// assert_eq!(format_value(5.5), "5.5");
/// ```
pub fn format_value(value: f64) -> String {
    format!("{}", round_to(value, 2))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
