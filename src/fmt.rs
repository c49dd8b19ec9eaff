//! Human-readable formatting for byte sizes and durations.
//!
//! Used by STATS output, the STRESS report, and the per-reply timing suffix
//! appended in debug mode.

use std::time::Duration;

/// Formats a byte count with a binary-unit suffix, e.g. `1.50 MB`.
pub fn format_memory_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    const SUFFIXES: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes as f64;
    let mut idx = 0;
    while value >= 1024.0 && idx < SUFFIXES.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    format!("{:.2} {}", value, SUFFIXES[idx])
}

/// Formats a duration at a precision appropriate to its magnitude:
/// microseconds below 1 ms, milliseconds below 1 s, then seconds,
/// minutes and hours.
pub fn format_duration(d: Duration) -> String {
    let seconds = d.as_secs_f64();
    if seconds < 0.001 {
        format!("{:.2}\u{b5}s", seconds * 1_000_000.0)
    } else if seconds < 1.0 {
        format!("{:.2}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.3}s", seconds)
    } else if seconds < 3600.0 {
        format!("{}m {:.2}s", (seconds as u64) / 60, seconds % 60.0)
    } else {
        format!(
            "{}h {}m {:.2}s",
            (seconds as u64) / 3600,
            ((seconds as u64) % 3600) / 60,
            seconds % 60.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_size_units() {
        assert_eq!(format_memory_size(0), "0 B");
        assert_eq!(format_memory_size(512), "512.00 B");
        assert_eq!(format_memory_size(1024), "1.00 KB");
        assert_eq!(format_memory_size(1536), "1.50 KB");
        assert_eq!(format_memory_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_memory_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn duration_magnitudes() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250.00\u{b5}s");
        assert_eq!(format_duration(Duration::from_millis(12)), "12.00ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.000s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30.00s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5.00s");
    }
}
