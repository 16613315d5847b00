//! Formatting and date helpers shared by the handlers.

use chrono::{DateTime, NaiveDate, Utc};

/// Format an amount as US dollars with thousands separators.
///
/// Whole amounts drop the cents: 2000.0 → "$2,000", 2500.5 → "$2,500.50".
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative && cents > 0 { "-" } else { "" };
    if frac == 0 {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{:02}", sign, grouped, frac)
    }
}

/// "1 deal", "2 deals". Only handles regular plurals.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Whole-number percentage: 0.6 → "60%".
pub fn format_percent(ratio: f64) -> String {
    format!("{}%", (ratio * 100.0).round() as i64)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whole days between `timestamp` and `now`. `None` if unparseable.
pub fn days_since(timestamp: &str, now: DateTime<Utc>) -> Option<i64> {
    parse_timestamp(timestamp).map(|then| (now - then).num_days())
}

/// `days` before `now`, clamped to the earliest representable instant.
pub fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    chrono::Duration::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Cutoff timestamp `days` before `now`, in the format the store compares against.
pub fn cutoff_timestamp(now: DateTime<Utc>, days: u32) -> String {
    days_before(now, days).to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(2000.0), "$2,000");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency(2500.5), "$2,500.50");
        assert_eq!(format_currency(-1500.0), "-$1,500");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(0, "deal"), "0 deals");
        assert_eq!(pluralize(1, "deal"), "1 deal");
        assert_eq!(pluralize(2, "deal"), "2 deals");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.6), "60%");
        assert_eq!(format_percent(2.0 / 3.0), "67%");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2026-03-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01T01:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01"), Some(expected));
        assert_eq!(parse_timestamp("last tuesday"), None);
    }

    #[test]
    fn test_days_since_and_cutoff() {
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
        assert_eq!(days_since("2026-10-01T12:00:00Z", now), Some(14));
        assert_eq!(cutoff_timestamp(now, 14), "2026-10-01T12:00:00Z");
    }

    #[test]
    fn test_days_before_clamps_out_of_range_windows() {
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
        assert_eq!(days_before(now, 999_999_999), DateTime::<Utc>::MIN_UTC);
        assert_eq!(days_before(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
    }
}
