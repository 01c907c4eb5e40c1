mod inmemory;

pub use inmemory::InMemorySendRecordRepo;
use task_reminders_domain::{SendRecord, SendRecordKey, ID};

/// Read side of the idempotency guard. Records are only written together
/// with the delivered reminder, see `ITaskRepo::commit_delivery`.
#[async_trait::async_trait]
pub trait ISendRecordRepo: Send + Sync {
    async fn find(&self, key: &SendRecordKey) -> anyhow::Result<Option<SendRecord>>;
    async fn find_by_task(&self, task_id: &ID) -> anyhow::Result<Vec<SendRecord>>;
}
