use crate::{evaluator::delivery_window, reminder::Reminder, shared::entity::ID};
use chrono::prelude::*;

/// Proof that one occurrence of a reminder was delivered. At most one record
/// can exist per `(task_id, reminder_key, window)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SendRecord {
    pub task_id: ID,
    pub reminder_key: String,
    pub window: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SendRecordKey {
    pub task_id: ID,
    pub reminder_key: String,
    pub window: String,
}

impl SendRecord {
    /// Record for delivering the occurrence of `reminder` that is due at `now`
    pub fn new(task_id: &ID, reminder: &Reminder, now: &DateTime<Utc>) -> Self {
        Self {
            task_id: task_id.clone(),
            reminder_key: reminder.key(),
            window: delivery_window(reminder, now),
            sent_at: *now,
        }
    }

    pub fn key(&self) -> SendRecordKey {
        SendRecordKey {
            task_id: self.task_id.clone(),
            reminder_key: self.reminder_key.clone(),
            window: self.window.clone(),
        }
    }
}
