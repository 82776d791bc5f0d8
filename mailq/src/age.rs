//! Message age from the year-less `mailq` arrival column.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot parse arrival time '{0}'")]
pub struct TimestampParseError(pub String);

/// Age in seconds of a message listed with arrival time `listed`, relative
/// to `now`.
///
/// `mailq` prints no year, so the current year is assumed first. If that
/// puts the arrival in the future, the message must have been queued
/// before the last year change and one year is subtracted. The correction
/// is applied exactly once: a queue item older than a year would come out
/// wrong, but such items are assumed not to exist.
///
/// The caller supplies `now` in whatever timezone the machine running
/// `mailq` reports its arrival times in (normally `Local::now()`).
pub fn message_age<Tz: TimeZone>(
    listed: &str,
    now: &DateTime<Tz>,
) -> Result<i64, TimestampParseError> {
    let parse_err = || TimestampParseError(listed.to_owned());
    let fields: Vec<&str> = listed.split_whitespace().collect();
    // The leading weekday is redundant and would contradict the calendar
    // after the year-rollover correction, so it is dropped entirely.
    let (month, day, time) = match fields.as_slice() {
        [_, month, day, time] | [month, day, time] => (*month, *day, *time),
        _ => return Err(parse_err()),
    };
    let tz = now.timezone();
    let candidate = arrival(&tz, month, day, time, now.year()).ok_or_else(parse_err)?;
    let candidate = if candidate > *now {
        arrival(&tz, month, day, time, now.year() - 1).ok_or_else(parse_err)?
    } else {
        candidate
    };
    Ok(now.clone().signed_duration_since(candidate).num_seconds())
}

fn arrival<Tz: TimeZone>(
    tz: &Tz,
    month: &str,
    day: &str,
    time: &str,
    year: i32,
) -> Option<DateTime<Tz>> {
    let joined = format!("{} {} {} {}", year, month, day, time);
    let naive = NaiveDateTime::parse_from_str(&joined, "%Y %b %d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&joined, "%Y %b %d %H:%M"))
        .ok()?;
    // DST gaps make some local times nonexistent; of ambiguous ones, pick
    // the earlier mapping.
    tz.from_local_datetime(&naive).earliest()
}
