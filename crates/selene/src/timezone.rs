//! IANA timezone resolution for local wall-clock instants.
//!
//! Offsets are resolved for the specific instant, so historical DST rules
//! apply to birth charts.

use crate::error::EngineError;
use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone name ("Europe/Moscow").
pub fn parse_timezone(name: &str) -> Result<Tz, EngineError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone {
            name: name.to_string(),
        })
}

/// Convert a local wall-clock time to UTC under `tz`.
///
/// Ambiguous times take the earlier mapping. Times inside a spring-forward
/// gap are moved forward by one hour.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = local + Duration::hours(1);
            match tz.from_local_datetime(&shifted) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
                LocalResult::None => Utc.from_utc_datetime(&local),
            }
        }
    }
}

/// Resolve the UTC offset in effect for `local` in the named zone.
pub fn utc_offset_at(local: NaiveDateTime, tz_name: &str) -> Result<FixedOffset, EngineError> {
    let tz = parse_timezone(tz_name)?;
    let utc = local_to_utc(local, tz);
    Ok(utc.with_timezone(&tz).offset().fix())
}

/// Like [`local_to_utc`] but by zone name, treating unknown zones as UTC.
pub fn resolve_utc(local: NaiveDateTime, tz_name: &str) -> DateTime<Utc> {
    match parse_timezone(tz_name) {
        Ok(tz) => local_to_utc(local, tz),
        Err(e) => {
            log::warn!("{}; falling back to UTC offset 0", e);
            Utc.from_utc_datetime(&local)
        }
    }
}

/// Local wall-clock time on `date` at `hour`:00.
pub fn local_at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

/// Current calendar date in the named zone (UTC when unknown).
pub fn today_in(tz_name: &str) -> NaiveDate {
    let now = Utc::now();
    match parse_timezone(tz_name) {
        Ok(tz) => now.with_timezone(&tz).date_naive(),
        Err(_) => now.date_naive(),
    }
}
