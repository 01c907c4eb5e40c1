mod inmemory;

use chrono::prelude::*;
pub use inmemory::InMemoryTaskRepo;
use task_reminders_domain::{Reminder, SendRecord, Task, ID};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommitDeliveryError {
    #[error("This reminder occurrence has already been delivered")]
    AlreadyDelivered,
    #[error("Task with id: {0} was not found")]
    TaskNotFound(ID),
    #[error("Reminder: {0} is no longer part of the task")]
    ReminderNotFound(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait ITaskRepo: Send + Sync {
    async fn insert(&self, task: &Task) -> anyhow::Result<()>;
    async fn save(&self, task: &Task) -> anyhow::Result<()>;
    async fn find(&self, task_id: &ID) -> Option<Task>;
    /// Deletes the task together with its send records
    async fn delete(&self, task_id: &ID) -> Option<Task>;
    /// Tasks that are not completed and whose deadline is after `now`
    async fn find_active(&self, now: &DateTime<Utc>) -> anyhow::Result<Vec<Task>>;
    /// Stores the delivered `reminder` and its `send_record` in one
    /// transaction. Fails with `AlreadyDelivered` without writing anything if
    /// a record for the same occurrence exists.
    async fn commit_delivery(
        &self,
        task_id: &ID,
        reminder: &Reminder,
        send_record: &SendRecord,
    ) -> Result<(), CommitDeliveryError>;
}
