use crate::{
    date::{format_instant, parse_instant, parse_timezone, same_time_of_day, DateError},
    reminder::{
        build_one_time_from_date, build_one_time_from_hours, build_recurring, InvalidReminder,
        RawReminderSpec, Reminder,
    },
};
use chrono::prelude::*;
use chrono_tz::Tz;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Turns the raw reminder specs submitted for a task into its canonical
/// reminder list.
///
/// Returns an empty list when `raw_specs` is not an array or `deadline` is
/// missing or unparseable. Individual specs that are malformed or no longer
/// valid are dropped, the rest of the batch is still processed.
///
/// `prior_deadline` is the deadline the reminders were previously computed
/// against. Recurring reminders only keep their delivery history when the
/// deadline time of day is unchanged.
pub fn normalize(
    raw_specs: &Value,
    deadline: Option<&str>,
    timezone: &str,
    prior_deadline: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<Reminder> {
    let deadline = match deadline.map(parse_instant) {
        Some(Ok(deadline)) => deadline,
        _ => return Vec::new(),
    };
    let raw_specs = match raw_specs.as_array() {
        Some(raw_specs) => raw_specs,
        None => return Vec::new(),
    };
    let prior_deadline = prior_deadline.and_then(|prior| parse_instant(prior).ok());

    normalize_for_task(raw_specs, deadline, timezone, prior_deadline, now)
}

/// Same as [`normalize`] for callers that already hold a parsed deadline
pub fn normalize_for_task(
    raw_specs: &[Value],
    deadline: DateTime<Utc>,
    timezone: &str,
    prior_deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<Reminder> {
    if deadline <= now {
        return Vec::new();
    }

    let tz = parse_timezone(timezone);
    let keep_history = prior_deadline
        .map(|prior| same_time_of_day(&prior, &deadline))
        .unwrap_or(false);

    let mut seen_recurring = HashSet::new();
    let mut seen_one_time = HashSet::new();
    let mut reminders = Vec::new();

    for raw in raw_specs {
        let spec = match RawReminderSpec::parse(raw) {
            Ok(spec) => spec,
            Err(reason) => {
                debug!(%reason, "Dropping reminder spec");
                continue;
            }
        };

        if let RawReminderSpec::Recurring { reminder_type, .. } = &spec {
            if seen_recurring.contains(reminder_type) {
                debug!(%reminder_type, "Dropping duplicate recurring reminder");
                continue;
            }
        }

        let reminder = match resolve(spec, deadline, tz.as_ref(), keep_history, now) {
            Ok(reminder) => reminder,
            Err(reason) => {
                debug!(%reason, "Dropping reminder spec");
                continue;
            }
        };

        let first_of_its_kind = match reminder.remind_at {
            Some(remind_at) => seen_one_time.insert(format_instant(&remind_at)),
            None => seen_recurring.insert(reminder.reminder_type),
        };
        if !first_of_its_kind {
            debug!(key = %reminder.key(), "Dropping duplicate reminder");
            continue;
        }

        reminders.push(reminder);
    }

    reminders
}

fn resolve(
    spec: RawReminderSpec,
    deadline: DateTime<Utc>,
    tz: Result<&Tz, &DateError>,
    keep_history: bool,
    now: DateTime<Utc>,
) -> Result<Reminder, InvalidReminder> {
    match spec {
        RawReminderSpec::Recurring {
            reminder_type,
            state,
        } => {
            let mut reminder = build_recurring(reminder_type, Some(deadline), now)?;
            if keep_history {
                reminder.last_sent_at = state.last_sent_at;
            }
            Ok(reminder)
        }
        RawReminderSpec::Explicit { remind_at, state } => {
            if remind_at >= deadline {
                return Err(InvalidReminder::NotBeforeDeadline);
            }
            let mut reminder = Reminder::one_time(remind_at);
            reminder.sent = state.sent;
            reminder.last_sent_at = state.last_sent_at;
            Ok(reminder)
        }
        RawReminderSpec::CustomDate(custom_date) => match tz {
            Ok(tz) => build_one_time_from_date(&custom_date, Some(deadline), tz, now),
            Err(e) => Err(InvalidReminder::InvalidTimezone(e.to_string())),
        },
        RawReminderSpec::RelativeHours(hours) => {
            build_one_time_from_hours(hours, Some(deadline), now)
        }
    }
}
