use crate::{reminder::Reminder, shared::entity::{Entity, ID}};
use chrono::prelude::*;
use chrono_tz::{Tz, UTC};

/// The task a set of reminders belongs to. Tasks are owned by the caller,
/// reminders only reference the deadline and timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub deadline: Option<DateTime<Utc>>,
    /// Timezone the user expresses wall clock times in
    pub timezone: Tz,
    pub completed: bool,
    pub reminders: Vec<Reminder>,
}

impl Task {
    pub fn new(user_id: &ID, title: &str, deadline: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Default::default(),
            user_id: user_id.clone(),
            title: title.to_string(),
            deadline,
            timezone: UTC,
            completed: false,
            reminders: Vec::new(),
        }
    }

    /// Tasks that are completed or past their deadline never get reminders
    pub fn is_active(&self, now: &DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => !self.completed && deadline > *now,
            None => false,
        }
    }

    /// Replaces the reminder with the same key. Returns false if there was none.
    pub fn replace_reminder(&mut self, reminder: &Reminder) -> bool {
        let key = reminder.key();
        match self.reminders.iter_mut().find(|r| r.key() == key) {
            Some(existing) => {
                *existing = reminder.clone();
                true
            }
            None => false,
        }
    }
}

impl Entity for Task {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{marker::mark_sent, ReminderType};
    use chrono::Duration;

    #[test]
    fn active_tasks() {
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let user_id = ID::default();

        let mut task = Task::new(&user_id, "Write report", Some(now + Duration::hours(1)));
        assert!(task.is_active(&now));
        task.completed = true;
        assert!(!task.is_active(&now));

        assert!(!Task::new(&user_id, "Overdue", Some(now)).is_active(&now));
        assert!(!Task::new(&user_id, "Someday", None).is_active(&now));
    }

    #[test]
    fn replaces_reminder_by_key() {
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let mut task = Task::new(&ID::default(), "Pay rent", Some(now + Duration::days(5)));
        task.reminders = vec![
            Reminder::one_time(now - Duration::hours(1)),
            Reminder::recurring(ReminderType::Daily).unwrap(),
        ];

        let delivered = mark_sent(&task.reminders[1], &now);
        assert!(task.replace_reminder(&delivered));
        assert_eq!(task.reminders[1].last_sent_at, Some(now));
        assert!(!task.reminders[0].sent);

        let unknown = Reminder::one_time(now + Duration::hours(1));
        assert!(!task.replace_reminder(&unknown));
        assert_eq!(task.reminders.len(), 2);
    }
}
