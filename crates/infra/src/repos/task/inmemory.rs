use super::{CommitDeliveryError, ITaskRepo};
use crate::repos::shared::inmemory_repo::*;
use chrono::prelude::*;
use std::sync::{Arc, Mutex};
use task_reminders_domain::{Reminder, SendRecord, Task, ID};

pub struct InMemoryTaskRepo {
    tasks: Mutex<Vec<Task>>,
    send_records: Arc<Mutex<Vec<SendRecord>>>,
}

impl InMemoryTaskRepo {
    pub fn new(send_records: Arc<Mutex<Vec<SendRecord>>>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            send_records,
        }
    }
}

#[async_trait::async_trait]
impl ITaskRepo for InMemoryTaskRepo {
    async fn insert(&self, task: &Task) -> anyhow::Result<()> {
        insert(task, &self.tasks);
        Ok(())
    }

    async fn save(&self, task: &Task) -> anyhow::Result<()> {
        if save(task, &self.tasks) {
            Ok(())
        } else {
            Err(anyhow::Error::msg(format!("Task with id: {} does not exist", task.id)))
        }
    }

    async fn find(&self, task_id: &ID) -> Option<Task> {
        find(task_id, &self.tasks)
    }

    async fn delete(&self, task_id: &ID) -> Option<Task> {
        let task = delete(task_id, &self.tasks)?;
        delete_by(&self.send_records, |record| record.task_id == *task_id);
        Some(task)
    }

    async fn find_active(&self, now: &DateTime<Utc>) -> anyhow::Result<Vec<Task>> {
        Ok(find_by(&self.tasks, |task| task.is_active(now)))
    }

    async fn commit_delivery(
        &self,
        task_id: &ID,
        reminder: &Reminder,
        send_record: &SendRecord,
    ) -> Result<(), CommitDeliveryError> {
        // Always tasks first, then send records
        let mut tasks = lock(&self.tasks);
        let mut send_records = lock(&self.send_records);

        let key = send_record.key();
        if send_records.iter().any(|record| record.key() == key) {
            return Err(CommitDeliveryError::AlreadyDelivered);
        }
        let task = tasks
            .iter_mut()
            .find(|task| task.id == *task_id)
            .ok_or_else(|| CommitDeliveryError::TaskNotFound(task_id.clone()))?;
        if !task.replace_reminder(reminder) {
            return Err(CommitDeliveryError::ReminderNotFound(reminder.key()));
        }
        send_records.push(send_record.clone());

        Ok(())
    }
}
