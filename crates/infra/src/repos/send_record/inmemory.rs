use super::ISendRecordRepo;
use crate::repos::shared::inmemory_repo::*;
use std::sync::{Arc, Mutex};
use task_reminders_domain::{SendRecord, SendRecordKey, ID};

pub struct InMemorySendRecordRepo {
    send_records: Arc<Mutex<Vec<SendRecord>>>,
}

impl InMemorySendRecordRepo {
    /// `send_records` is shared with the task repo which writes to it
    pub fn new(send_records: Arc<Mutex<Vec<SendRecord>>>) -> Self {
        Self { send_records }
    }
}

#[async_trait::async_trait]
impl ISendRecordRepo for InMemorySendRecordRepo {
    async fn find(&self, key: &SendRecordKey) -> anyhow::Result<Option<SendRecord>> {
        Ok(find_by(&self.send_records, |record| record.key() == *key)
            .into_iter()
            .next())
    }

    async fn find_by_task(&self, task_id: &ID) -> anyhow::Result<Vec<SendRecord>> {
        Ok(find_by(&self.send_records, |record| record.task_id == *task_id))
    }
}
