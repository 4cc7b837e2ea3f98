//! Server-time formatting and parsing for the IRCv3 `server-time` tag and
//! `CHATHISTORY`/`MARKREAD` timestamp bounds.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a time as an IRCv3 server-time string.
///
/// Always fixed width: `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a time as a `timestamp=` criterion, as used by `CHATHISTORY`
/// bounds and `MARKREAD`.
pub fn format_bound(t: DateTime<Utc>) -> String {
    format!("timestamp={}", format_timestamp(t))
}

/// Parse an IRCv3 server-time string.
///
/// Accepts RFC 3339 formatted timestamps like `2023-01-01T12:00:00.000Z`.
pub fn parse_server_time(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a `timestamp=` criterion.
///
/// `*` (no read marker) and anything not prefixed with `timestamp=` yield
/// `None`.
pub fn parse_bound(bound: &str) -> Option<DateTime<Utc>> {
    bound.strip_prefix("timestamp=").and_then(parse_server_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let t = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(t), "2023-01-02T03:04:05.000Z");
        assert_eq!(format_bound(t), "timestamp=2023-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_parse_round_trip() {
        let t = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(parse_server_time(&format_timestamp(t)), Some(t));
        assert_eq!(parse_bound(&format_bound(t)), Some(t));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_server_time("yesterday"), None);
        assert_eq!(parse_bound("*"), None);
        assert_eq!(parse_bound("msgid=abc"), None);
    }
}
