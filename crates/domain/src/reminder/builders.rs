use super::{InvalidReminder, Reminder, ReminderType};
use crate::date::parse_wall_clock;
use chrono::{prelude::*, Duration};
use chrono_tz::Tz;

// Anything longer than this lands long before any representable "now"
const MAX_LEAD_HOURS: f64 = 24.0 * 365.0 * 1000.0;

/// One-time reminder firing `hours` before the deadline
pub fn build_one_time_from_hours(
    hours: f64,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Reminder, InvalidReminder> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(InvalidReminder::NonPositiveLeadTime);
    }
    let deadline = deadline.ok_or(InvalidReminder::MissingDeadline)?;
    if hours > MAX_LEAD_HOURS {
        return Err(InvalidReminder::NotInFuture);
    }

    let lead_time = Duration::milliseconds((hours * 60.0 * 60.0 * 1000.0).round() as i64);
    let remind_at = deadline
        .checked_sub_signed(lead_time)
        .ok_or(InvalidReminder::NotInFuture)?;
    if remind_at <= now {
        return Err(InvalidReminder::NotInFuture);
    }

    Ok(Reminder::one_time(remind_at))
}

/// One-time reminder at a wall clock time chosen by the user in `tz`
pub fn build_one_time_from_date(
    custom_date: &str,
    deadline: Option<DateTime<Utc>>,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<Reminder, InvalidReminder> {
    let deadline = deadline.ok_or(InvalidReminder::MissingDeadline)?;
    let remind_at = parse_wall_clock(custom_date, tz, now)
        .map_err(|_| InvalidReminder::UnparseableDate(custom_date.to_string()))?;

    if remind_at <= now {
        return Err(InvalidReminder::NotInFuture);
    }
    if remind_at >= deadline {
        return Err(InvalidReminder::NotBeforeDeadline);
    }

    Ok(Reminder::one_time(remind_at))
}

/// Daily or weekly reminder. At least one full cycle has to fit between
/// `now` and the deadline.
pub fn build_recurring(
    reminder_type: ReminderType,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Reminder, InvalidReminder> {
    let interval_hours = reminder_type
        .interval_hours()
        .ok_or(InvalidReminder::NotRecurring(reminder_type))?;
    let deadline = deadline.ok_or(InvalidReminder::MissingDeadline)?;

    if deadline - now < Duration::hours(interval_hours) {
        return Err(InvalidReminder::CycleDoesNotFit { interval_hours });
    }

    Reminder::recurring(reminder_type).ok_or(InvalidReminder::NotRecurring(reminder_type))
}
