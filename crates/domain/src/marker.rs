use crate::reminder::{Reminder, ReminderType};
use chrono::prelude::*;

/// Records a successful delivery of `reminder` at `now`.
///
/// One-time reminders become terminal. Recurring reminders only move their
/// cadence forward and stay eligible until the deadline passes. Must only be
/// applied once per confirmed delivery.
pub fn mark_sent(reminder: &Reminder, now: &DateTime<Utc>) -> Reminder {
    let mut delivered = reminder.clone();
    delivered.last_sent_at = Some(*now);
    if reminder.reminder_type == ReminderType::OneTime {
        delivered.sent = true;
    }
    delivered
}
