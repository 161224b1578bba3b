//! Date parsing and date-token normalization for post dates

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Canonical calendar date format stored in `createdAt`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Loose year-month-day token: `2025.07.05`, `2025. 07. 05.`, `2025/07/05`, `2025-07-05`
fn date_token_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"([0-9]{4})([./-])\s?([0-9]{2})([./-])\s?([0-9]{2})(\.?)").unwrap()
    })
}

/// `YYYY-MM-DD` anywhere inside a string
fn embedded_iso_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"([0-9]{4})-([0-9]{2})-([0-9]{2})").unwrap())
}

/// Rewrite every loose date token in `text` to `YYYY-MM-DD`.
///
/// Tokens already written as `YYYY-MM-DD` are left untouched, including a
/// trailing period, so applying this twice gives the same result as once.
pub fn normalize_date_tokens(text: &str) -> Cow<'_, str> {
    date_token_regex().replace_all(text, |caps: &Captures| {
        let whole = &caps[0];
        let canonical = &caps[2] == "-" && &caps[4] == "-" && !whole.contains(char::is_whitespace);
        if canonical {
            whole.to_string()
        } else {
            format!("{}-{}-{}", &caps[1], &caps[3], &caps[5])
        }
    })
}

/// Parse a stored `createdAt` into a calendar date.
///
/// Accepts RFC 3339 / ISO datetimes, plain ISO dates, strings with an embedded
/// `YYYY-MM-DD`, and loose tokens such as `2025. 07. 05.`. Returns `None` when
/// nothing date-like is found.
pub fn parse_post_date(created_at: &str) -> Option<NaiveDate> {
    parse_sort_key(created_at).map(|dt| dt.date())
}

/// Parse a stored `createdAt`, falling back to `today` when it is unusable
pub fn post_date_or(created_at: &str, today: NaiveDate) -> NaiveDate {
    parse_post_date(created_at).unwrap_or(today)
}

/// Date-time used to order posts, most precise form first
pub fn parse_sort_key(created_at: &str) -> Option<NaiveDateTime> {
    let trimmed = created_at.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    let normalized = normalize_date_tokens(trimmed);
    embedded_iso_regex().captures(&normalized).and_then(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

/// Date string shown for a post, normalizing legacy formats
pub fn display_created_at(created_at: &str) -> String {
    normalize_date_tokens(created_at.trim()).into_owned()
}

/// Parse a user-supplied `YYYY-MM-DD` date
pub fn parse_input_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}
