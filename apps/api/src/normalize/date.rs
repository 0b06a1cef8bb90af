//! Timestamp normalization for the three crawl sources.
//!
//! Every source formats dates differently. All of them are normalized to
//! [`CANONICAL_FORMAT`] before a draft leaves its adapter; anything that does
//! not parse becomes `None` so the field is omitted instead of failing the run.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Datetime layouts seen in vendor feeds, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    CANONICAL_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y%m%d%H%M%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y%m%d"];

fn canonical(dt: NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

fn midnight(date: NaiveDate) -> String {
    canonical(date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Parses the board's long form, e.g. `2024년11월05일 10시30분00초`.
///
/// Locale separators are rewritten to `-`, ` ` and `:` first, so the
/// result must read `YYYY-MM-DD HH:MM:SS`. A date with no time part is
/// taken as midnight.
pub fn normalize_korean_datetime(raw: &str) -> Option<String> {
    let mut rewritten = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match ch {
            '년' | '월' => rewritten.push('-'),
            '일' => rewritten.push(' '),
            '시' | '분' => rewritten.push(':'),
            '초' => {}
            c if c.is_whitespace() => {}
            c => rewritten.push(c),
        }
    }
    let rewritten = rewritten.trim();
    if rewritten.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(rewritten, CANONICAL_FORMAT) {
        return Some(canonical(dt));
    }
    NaiveDate::parse_from_str(rewritten, "%Y-%m-%d")
        .ok()
        .map(midnight)
}

/// Parses the department board's `YYYY.MM.DD`, tolerating a trailing dot.
pub fn normalize_dotted_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('.');
    NaiveDate::parse_from_str(trimmed, "%Y.%m.%d")
        .ok()
        .map(midnight)
}

/// Best-effort parse of an arbitrary vendor timestamp.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(canonical(dt.naive_local()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(canonical(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(midnight(date));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_long_form() {
        assert_eq!(
            normalize_korean_datetime("2024년11월05일 10시30분07초").as_deref(),
            Some("2024-11-05 10:30:07")
        );
    }

    #[test]
    fn test_korean_long_form_with_spacing() {
        assert_eq!(
            normalize_korean_datetime(" 2024년 11월 05일 09시 05분 00초 ").as_deref(),
            Some("2024-11-05 09:05:00")
        );
    }

    #[test]
    fn test_korean_date_only_is_midnight() {
        assert_eq!(
            normalize_korean_datetime("2024년11월05일").as_deref(),
            Some("2024-11-05 00:00:00")
        );
    }

    #[test]
    fn test_korean_garbage_is_none() {
        assert_eq!(normalize_korean_datetime("작성일 미상"), None);
        assert_eq!(normalize_korean_datetime(""), None);
        assert_eq!(normalize_korean_datetime("2024년13월40일 99시00분00초"), None);
    }

    #[test]
    fn test_dotted_date() {
        assert_eq!(
            normalize_dotted_date("2024.03.15").as_deref(),
            Some("2024-03-15 00:00:00")
        );
        assert_eq!(
            normalize_dotted_date("2024.03.15.").as_deref(),
            Some("2024-03-15 00:00:00")
        );
        assert_eq!(normalize_dotted_date("03/15/2024"), None);
    }

    #[test]
    fn test_vendor_timestamps() {
        let cases = [
            ("2024-11-05 10:30:00", "2024-11-05 10:30:00"),
            ("2024-11-05 10:30:00.0", "2024-11-05 10:30:00"),
            ("2024-11-05T10:30:00", "2024-11-05 10:30:00"),
            ("2024-11-05T10:30:00+09:00", "2024-11-05 10:30:00"),
            ("20241105103000", "2024-11-05 10:30:00"),
            ("2024.11.05", "2024-11-05 00:00:00"),
            ("2024-11-05", "2024-11-05 00:00:00"),
        ];
        for (raw, expected) in cases {
            assert_eq!(normalize_timestamp(raw).as_deref(), Some(expected), "{raw}");
        }
    }

    #[test]
    fn test_vendor_timestamp_garbage_is_none() {
        assert_eq!(normalize_timestamp("yesterday"), None);
        assert_eq!(normalize_timestamp("   "), None);
    }
}
