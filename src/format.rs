//! Display helpers shared by the list renderer and the progress reporter.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Formats an upload timestamp as `dd/mm/YYYY`.
///
/// The API sends `YYYY-MM-DD HH:MM:SS`, sometimes with a `T` separator or an
/// offset. Empty input yields an empty string; anything unparseable is
/// returned unchanged.
pub fn format_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let iso = raw.replacen(' ', "T", 1);
    match parse_date(&iso) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}

fn parse_date(iso: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Some(dt.date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(iso, pattern) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()
}

pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / BYTES_PER_MB)
}

/// Whole percentage of `value` against `max`, never above 100.
pub fn percent(value: u64, max: u64) -> u8 {
    if max == 0 {
        return 0;
    }
    let pct = (value as f64 / max as f64 * 100.0).floor();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_api_timestamps() {
        assert_eq!(format_date("2024-03-07 14:22:01"), "07/03/2024");
        assert_eq!(format_date("2024-03-07T14:22:01.123"), "07/03/2024");
        assert_eq!(format_date("2024-03-07T14:22:01+02:00"), "07/03/2024");
        assert_eq!(format_date("2024-03-07"), "07/03/2024");
    }

    #[test]
    fn malformed_dates_pass_through() {
        for raw in ["yesterday", "2024-13-45", "07/03/2024", "  "] {
            assert_eq!(format_date(raw), raw);
        }
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn megabytes_use_one_decimal() {
        assert_eq!(format_megabytes(2_621_440), "2.5 MB");
        assert_eq!(format_megabytes(0), "0.0 MB");
    }

    #[test]
    fn percent_is_capped() {
        assert_eq!(percent(1_048_576, 1_048_576), 100);
        assert_eq!(percent(50, 200), 25);
        assert_eq!(percent(300, 200), 100);
        assert_eq!(percent(10, 0), 0);
    }
}
