//! Timestamp creation and display formatting.
//!
//! Outbound messages carry RFC 3339 UTC timestamps; the server's own
//! broadcasts and history records carry zone-less `LocalDateTime` strings.
//! Display formatting accepts both.

#[cfg(test)]
#[path = "time_test.rs"]
mod time_test;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};

/// Current time as an RFC 3339 UTC string with millisecond precision,
/// e.g. `2025-11-02T10:15:30.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a message timestamp as a short `HH:MM` clock for the list row.
///
/// Offset-carrying timestamps are converted to the viewer's local time;
/// the server's zone-less strings are shown as sent. Unparseable input
/// renders as an empty string so a bad record cannot break the row.
pub fn format_message_time(timestamp: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.with_timezone(&Local).format("%H:%M").to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%H:%M").to_string();
    }
    String::new()
}
