//! `Retry-After` header interpretation.
//!
//! ```text
//! Retry-After: <http-date>      e.g. Retry-After: Wed, 21 Oct 2015 07:28:00 GMT
//! Retry-After: <delay-seconds>  e.g. Retry-After: 120
//! ```
//!
//! Missing or unparseable values fall back to [`DEFAULT_RETRY_AFTER`].

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Wait applied when the server gives no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// IMF-fixdate after the leading weekday, e.g. `21 Oct 2025 07:28:00 GMT`.
const HTTP_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S GMT";

/// Cool-down requested by a 429 response, measured from now.
pub fn retry_after(headers: &HeaderMap) -> Duration {
    retry_after_at(headers, Utc::now())
}

/// Cool-down requested by a 429 response, measured from `now`.
///
/// Header lookup is case-insensitive and only the first value is considered.
pub fn retry_after_at(headers: &HeaderMap, now: DateTime<Utc>) -> Duration {
    let Some(value) = headers.get(RETRY_AFTER) else {
        return DEFAULT_RETRY_AFTER;
    };

    let parsed = value
        .to_str()
        .ok()
        .and_then(|raw| parse_retry_after(raw, now));

    match parsed {
        Some(wait) => wait,
        None => {
            tracing::debug!(value = ?value, "Unparseable Retry-After header, using default");
            DEFAULT_RETRY_AFTER
        }
    }
}

/// Parse a single `Retry-After` value.
///
/// HTTP-dates in the past yield a zero wait. The weekday of a date is not
/// checked against the calendar.
pub fn parse_retry_after(raw: &str, now: DateTime<Utc>) -> Option<Duration> {
    let raw = raw.trim();

    if let Some(date) = parse_http_date(raw) {
        let delta = date - now;
        return Some(delta.to_std().unwrap_or(Duration::ZERO));
    }

    raw.parse::<u64>().ok().map(Duration::from_secs)
}

fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    let without_weekday = raw.split_once(", ").map_or(raw, |(_, rest)| rest);
    if let Ok(date) = NaiveDateTime::parse_from_str(without_weekday, HTTP_DATE_FORMAT) {
        return Some(date.and_utc());
    }

    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
