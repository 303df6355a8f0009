use chrono::{TimeZone, Utc};

use crate::config::is_valid_date_format;
use crate::format::format_compact;
use crate::time_scale::TimeInterval;

const MINUTE_MS: i64 = 60_000;
const DAY_MS: i64 = 86_400_000;

/// Format `ms` (UTC epoch milliseconds) with a strftime pattern.
///
/// Invalid patterns and out-of-range timestamps fall back to the raw number.
pub fn format_timestamp(ms: f64, fmt: &str) -> String {
    if !ms.is_finite() || !is_valid_date_format(fmt) {
        return format_compact(ms);
    }
    match Utc.timestamp_millis_opt(ms.round() as i64).single() {
        Some(dt) => dt.format(fmt).to_string(),
        None => format_compact(ms),
    }
}

/// Label pattern that shows what changes between two ticks `interval` apart.
pub fn auto_format(interval: Option<TimeInterval>) -> &'static str {
    match interval {
        Some(TimeInterval::Millis(_)) => "%H:%M:%S%.3f",
        Some(TimeInterval::Fixed(ms)) if ms < MINUTE_MS => "%H:%M:%S",
        Some(TimeInterval::Fixed(ms)) if ms < DAY_MS => "%H:%M",
        Some(TimeInterval::Fixed(_)) => "%b %d",
        Some(TimeInterval::Months(n)) if n < 12 => "%b %Y",
        Some(TimeInterval::Months(_)) => "%Y",
        None => "%Y-%m-%d",
    }
}

/// Label for a temporal key: the configured pattern if any, else [`auto_format`].
pub fn format_time_label(
    ms: f64,
    date_format: Option<&str>,
    interval: Option<TimeInterval>,
) -> String {
    let fmt = date_format.unwrap_or_else(|| auto_format(interval));
    format_timestamp(ms, fmt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(y: i32, m: u32, d: u32) -> f64 {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
            .unwrap()
            .timestamp_millis() as f64
    }

    #[test]
    fn formats_with_pattern() {
        assert_eq!(format_timestamp(ms(2024, 3, 9), "%Y-%m-%d"), "2024-03-09");
    }

    #[test]
    fn invalid_pattern_falls_back_to_number() {
        assert_eq!(format_timestamp(1_500.0, "%Q"), "1.5K");
    }

    #[test]
    fn auto_format_follows_step() {
        let jan = ms(2024, 1, 1);
        assert_eq!(
            format_time_label(jan, None, Some(TimeInterval::Months(1))),
            "Jan 2024"
        );
        assert_eq!(
            format_time_label(jan, None, Some(TimeInterval::Months(24))),
            "2024"
        );
        assert_eq!(
            format_time_label(jan, None, Some(TimeInterval::Fixed(DAY_MS))),
            "Jan 01"
        );
        assert_eq!(format_time_label(jan, Some("%d/%m"), None), "01/01");
    }
}
