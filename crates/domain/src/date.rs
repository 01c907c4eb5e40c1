use chrono::{prelude::*, Duration, LocalResult, SecondsFormat};
use chrono_tz::{Tz, UTC};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateError {
    #[error("`{0}` is not a valid IANA timezone")]
    InvalidTimezone(String),
    #[error("`{0}` could not be parsed as a point in time")]
    InvalidInstant(String),
    #[error("`{0}` does not exist in timezone {1}")]
    NonexistentLocalTime(String, Tz),
}

// Relative expressions further out than this are not a date anyone means
const MAX_RELATIVE_SECS: i64 = 1000 * 366 * 24 * 60 * 60;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timezone(timezone: &str) -> Result<Tz, DateError> {
    let timezone = timezone.trim();
    if timezone.is_empty() {
        return Ok(UTC);
    }
    timezone
        .parse::<Tz>()
        .map_err(|_| DateError::InvalidTimezone(timezone.to_string()))
}

/// Parses an ISO-8601 instant. Values without an offset are read as UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, DateError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_naive(value)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| DateError::InvalidInstant(value.to_string()))
}

/// Parses a wall-clock expression as the user would write it in `tz`.
///
/// Besides plain dates and date-times this understands a small set of
/// natural language forms:
/// - `today 17:30`, `tomorrow at 9am`
/// - `next friday at 08:00`
/// - `in 90 minutes`, `in 2 hours`, `in 3 days`, `in 1 week`
///
/// An explicit offset in the value always wins over `tz`. Local times that
/// are ambiguous because of a DST fold resolve to the earliest instant.
pub fn parse_wall_clock(value: &str, tz: &Tz, now: DateTime<Utc>) -> Result<DateTime<Utc>, DateError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(naive) = parse_naive(value) {
        return localize(&naive, tz, value);
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return localize(&midnight, tz, value);
    }
    parse_natural(value, tz, now)
}

pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Whether both instants share the same hour and minute of the day (UTC)
pub fn same_time_of_day(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    a.hour() == b.hour() && a.minute() == b.minute()
}

/// The instant on `day` (UTC) carrying the hour and minute of `deadline`
pub fn anchor_on(day: NaiveDate, deadline: &DateTime<Utc>) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(deadline.hour(), deadline.minute(), 0)
        .unwrap_or_else(|| deadline.time());
    Utc.from_utc_datetime(&day.and_time(time))
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn localize(naive: &NaiveDateTime, tz: &Tz, raw: &str) -> Result<DateTime<Utc>, DateError> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(a, b) => Ok(a.min(b).with_timezone(&Utc)),
        LocalResult::None => Err(DateError::NonexistentLocalTime(raw.to_string(), *tz)),
    }
}

fn parse_natural(value: &str, tz: &Tz, now: DateTime<Utc>) -> Result<DateTime<Utc>, DateError> {
    let invalid = || DateError::InvalidInstant(value.to_string());
    let lowered = value.to_lowercase();
    let tokens = lowered.split_whitespace().collect::<Vec<_>>();
    let today = now.with_timezone(tz).date_naive();

    let (day, rest) = match tokens.as_slice() {
        ["in", amount, unit] => {
            let amount = amount.parse::<i64>().map_err(|_| invalid())?;
            if amount < 0 {
                return Err(invalid());
            }
            let unit_secs = match unit.trim_end_matches('s') {
                "minute" | "min" => 60,
                "hour" | "hr" | "h" => 60 * 60,
                "day" => 24 * 60 * 60,
                "week" => 7 * 24 * 60 * 60,
                _ => return Err(invalid()),
            };
            let offset = amount
                .checked_mul(unit_secs)
                .filter(|secs| *secs <= MAX_RELATIVE_SECS)
                .map(Duration::seconds)
                .ok_or_else(invalid)?;
            return now.checked_add_signed(offset).ok_or_else(invalid);
        }
        ["today", rest @ ..] => (today, rest),
        ["tomorrow", rest @ ..] => (today + Duration::days(1), rest),
        ["next", weekday, rest @ ..] => {
            let weekday = weekday.parse::<Weekday>().map_err(|_| invalid())?;
            let ahead = (weekday.num_days_from_monday() as i64
                - today.weekday().num_days_from_monday() as i64
                + 7)
                % 7;
            let ahead = if ahead == 0 { 7 } else { ahead };
            (today + Duration::days(ahead), rest)
        }
        _ => return Err(invalid()),
    };

    let rest = match rest {
        ["at", rest @ ..] => rest,
        rest => rest,
    };
    let time = parse_clock_time(&rest.concat()).ok_or_else(invalid)?;
    localize(&day.and_time(time), tz, value)
}

/// Accepts `17:30`, `9:05:10`, `9am`, `5:30pm`, `noon` and `midnight`
fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    match value {
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
        _ => {}
    }

    let (clock, meridiem) = if let Some(clock) = value.strip_suffix("am") {
        (clock, Some(false))
    } else if let Some(clock) = value.strip_suffix("pm") {
        (clock, Some(true))
    } else {
        (value, None)
    };

    let parts = clock
        .split(':')
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;
    let (hour, minute, second) = match parts.as_slice() {
        [hour] if meridiem.is_some() => (*hour, 0, 0),
        [hour, minute] => (*hour, *minute, 0),
        [hour, minute, second] => (*hour, *minute, *second),
        _ => return None,
    };

    let hour = match meridiem {
        Some(_) if hour == 0 || hour > 12 => return None,
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}
