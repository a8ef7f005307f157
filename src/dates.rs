//! Relative-date parsing for the channel listing's "time ago" text.
//!
//! Rumble labels each listed video with a human-readable relative timestamp
//! such as `"3 hours ago"` or `"2 weeks ago"`. This module converts that text
//! into an absolute [`DateTime<Utc>`]:
//!
//! - **hours/minutes**: exact subtraction from the current instant, so the
//!   time-of-day is preserved
//! - **days/weeks/months/years**: subtraction from midnight of the current
//!   day, so results land on a midnight boundary; months are approximated as
//!   30 days and years as 365 days (no calendar-aware arithmetic)
//!
//! Unrecognized or unparseable text is never an error: the current time is
//! returned and a diagnostic is logged.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());

/// Time units recognized in relative-date text, in matching priority order.
const UNITS: [&str; 6] = ["hour", "minute", "day", "week", "month", "year"];

/// Parse relative-date text like `"3 hours ago"` against an explicit `now`.
///
/// The caller supplies `now` (the scrape driver passes `Utc::now()`, tests
/// pass a fixed instant) so results are deterministic.
///
/// Matching is by substring containment of the unit word, checked in the
/// fixed order hour → minute → day → week → month → year; the first unit
/// found wins, so singular and plural variants both match. Day-granularity
/// units anchor to midnight of `now`'s date rather than the current instant.
///
/// # Returns
///
/// The computed absolute timestamp, or `now` itself when no unit word or no
/// count is present (logged, never raised).
pub fn parse_relative_date_at(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(unit) = UNITS.iter().find(|unit| text.contains(*unit)) else {
        warn!(%text, "No recognized time unit in date text; using current time");
        return now;
    };
    let Some(count) = COUNT
        .captures(text)
        .and_then(|caps| caps[1].parse::<i64>().ok())
    else {
        warn!(%text, unit, "No count in date text; using current time");
        return now;
    };

    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let parsed = match *unit {
        "hour" => now - Duration::hours(count),
        "minute" => now - Duration::minutes(count),
        "day" => midnight - Duration::days(count),
        "week" => midnight - Duration::weeks(count),
        "month" => midnight - Duration::days(30 * count),
        "year" => midnight - Duration::days(365 * count),
        _ => unreachable!(),
    };
    debug!(%text, count, unit, %parsed, "Parsed relative date");
    parsed
}
