//! Utility functions for timestamps and diagnostic text.

pub mod safe_cast;

use chrono::{DateTime, Utc};

/// Format a wall-clock time the way the overlay shows it: `Now: 2024-05-01T12:00:00Z; `
#[must_use]
pub fn format_utc(now: DateTime<Utc>) -> String {
    format!("Now: {}; ", now.format("%FT%TZ"))
}

/// Full overlay line: UTC time, capture timestamp in microseconds and the run label
#[must_use]
pub fn overlay_text(now: DateTime<Utc>, timestamp_us: i64, label: &str) -> String {
    format!("{}ts: {}; {}", format_utc(now), timestamp_us, label)
}

/// Per-frame log line: label, capture timestamp, estimated angle and the bus reference if any
#[must_use]
pub fn frame_log_line(label: &str, timestamp_us: i64, angle: f64, reference: Option<f64>) -> String {
    match reference {
        Some(reference) => format!("{label};{timestamp_us};{angle:.4};{reference:.4}"),
        None => format!("{label};{timestamp_us};{angle:.4};"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_utc() {
        let time = Utc.with_ymd_and_hms(2020, 11, 3, 9, 5, 7).unwrap();
        assert_eq!(format_utc(time), "Now: 2020-11-03T09:05:07Z; ");
    }

    #[test]
    fn test_overlay_text() {
        let time = Utc.with_ymd_and_hms(2020, 11, 3, 9, 5, 7).unwrap();
        assert_eq!(
            overlay_text(time, 1_604_394_307_123_456, "car-1"),
            "Now: 2020-11-03T09:05:07Z; ts: 1604394307123456; car-1"
        );
    }

    #[test]
    fn test_frame_log_line() {
        assert_eq!(frame_log_line("car-1", 42, 0.025, Some(-0.1)), "car-1;42;0.0250;-0.1000");
        assert_eq!(frame_log_line("car-1", 42, 0.0, None), "car-1;42;0.0000;");
    }
}
