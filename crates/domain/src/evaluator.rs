use crate::{
    date::{anchor_on, format_instant},
    reminder::{Reminder, ReminderType},
};
use chrono::{prelude::*, Duration};

/// Where a reminder is in its lifecycle at a given point in time.
///
/// One-time reminders go `Pending -> Due -> Delivered`. Recurring reminders
/// start `Idle`, then cycle between `Due` and `Waiting` until the deadline
/// passes and they are `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Pending,
    Due,
    Delivered,
    Idle,
    Waiting,
    Expired,
}

/// Lifecycle state of `reminder` at `now`.
///
/// Recurring reminders are anchored to the deadline time of day (UTC): they
/// are only due once today's anchor is reached, and never more than once per
/// interval. A recurring reminder that was never sent is due as soon as
/// today's anchor has passed, which means one created after the anchor fires
/// on the very next tick.
pub fn reminder_state(reminder: &Reminder, deadline: &DateTime<Utc>, now: &DateTime<Utc>) -> ReminderState {
    if reminder.sent {
        return ReminderState::Delivered;
    }

    let interval_hours = match reminder.reminder_type.interval_hours() {
        Some(interval_hours) => interval_hours,
        None => {
            return match reminder.remind_at {
                Some(remind_at) if *now >= remind_at => ReminderState::Due,
                Some(_) => ReminderState::Pending,
                // A one-time reminder without a trigger instant can never fire
                None => ReminderState::Expired,
            };
        }
    };

    if now >= deadline {
        return ReminderState::Expired;
    }
    let anchor_reached = *now >= anchor_on(now.date_naive(), deadline);

    match reminder.last_sent_at {
        None if anchor_reached => ReminderState::Due,
        None => ReminderState::Idle,
        Some(last_sent_at)
            if anchor_reached && *now - last_sent_at >= Duration::hours(interval_hours) =>
        {
            ReminderState::Due
        }
        Some(_) => ReminderState::Waiting,
    }
}

/// The reminders that should be delivered right now
pub fn get_due(
    reminders: &[Reminder],
    deadline: Option<&DateTime<Utc>>,
    now: &DateTime<Utc>,
) -> Vec<Reminder> {
    let deadline = match deadline {
        Some(deadline) => deadline,
        None => return Vec::new(),
    };

    reminders
        .iter()
        .filter(|reminder| reminder_state(reminder, deadline, now) == ReminderState::Due)
        .cloned()
        .collect()
}

/// When the reminder will next be due. Reminders that are due already
/// report `now`, finished ones report `None`.
pub fn next_trigger_at(
    reminder: &Reminder,
    deadline: &DateTime<Utc>,
    now: &DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if reminder.sent {
        return None;
    }

    let interval_hours = match reminder.reminder_type.interval_hours() {
        Some(interval_hours) => interval_hours,
        None => return reminder.remind_at.map(|remind_at| remind_at.max(*now)),
    };

    let earliest = reminder
        .last_sent_at
        .map(|last_sent_at| last_sent_at + Duration::hours(interval_hours))
        .unwrap_or(*now)
        .max(*now);
    let next = anchor_on(earliest.date_naive(), deadline).max(earliest);

    if next < *deadline {
        Some(next)
    } else {
        None
    }
}

/// Identifies the occurrence of `reminder` that is due at `now`. Two
/// deliveries of the same reminder in the same window are duplicates.
///
/// One-time reminders only have a single occurrence. Recurring reminders
/// can only be due after the anchor of the current day, so the day
/// identifies the occurrence.
pub fn delivery_window(reminder: &Reminder, now: &DateTime<Utc>) -> String {
    match (reminder.reminder_type, &reminder.remind_at) {
        (ReminderType::OneTime, Some(remind_at)) => format_instant(remind_at),
        _ => now.date_naive().format("%Y-%m-%d").to_string(),
    }
}
