mod send_record;
mod shared;
mod task;

pub use send_record::{ISendRecordRepo, InMemorySendRecordRepo};
use std::sync::{Arc, Mutex};
pub use task::{CommitDeliveryError, ITaskRepo, InMemoryTaskRepo};

#[derive(Clone)]
pub struct Repos {
    pub tasks: Arc<dyn ITaskRepo>,
    pub send_records: Arc<dyn ISendRecordRepo>,
}

impl Repos {
    pub fn create_inmemory() -> Self {
        let send_records = Arc::new(Mutex::new(Vec::new()));
        Self {
            tasks: Arc::new(InMemoryTaskRepo::new(send_records.clone())),
            send_records: Arc::new(InMemorySendRecordRepo::new(send_records)),
        }
    }
}
