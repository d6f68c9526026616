//! Outbound message cleaning.
//!
//! Users occasionally paste lines out of exported chat logs, which arrive
//! with a `//<name><meridiem> HH:MM:SS` prefix and non-breaking-space
//! escapes. Both are stripped before a message is published.

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod sanitize_test;

use std::sync::LazyLock;

use regex::Regex;

// Meridiem markers cover the English log format and the Korean one the
// product originally shipped with.
static LOG_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^//\S+(AM|PM|오전|오후)\s\d{1,2}:\d{2}:\d{2}\s*").expect("log prefix pattern")
});

/// Clean raw input for publishing. Returns an empty string when nothing
/// sendable remains, which callers treat as a rejected send.
pub fn sanitize_outbound(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = LOG_PREFIX.replace(trimmed, "");
    stripped
        .replace("[nbsp]", " ")
        .replace("&nbsp;", " ")
        .trim()
        .to_owned()
}
