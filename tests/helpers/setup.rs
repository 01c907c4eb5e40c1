use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use task_reminders_domain::{Reminder, Task, ID};
use task_reminders_infra::{IReminderSink, ISys, ReminderContext};

/// Clock that only moves when told to
pub struct ManualSys {
    now: Mutex<DateTime<Utc>>,
}

impl ManualSys {
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl ISys for ManualSys {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<(ID, Reminder)>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<(ID, Reminder)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IReminderSink for RecordingSink {
    async fn deliver(&self, task: &Task, reminder: &Reminder) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("Delivery target is unavailable");
        }
        self.delivered
            .lock()
            .unwrap()
            .push((task.id.clone(), reminder.clone()));
        Ok(())
    }
}

pub struct TestApp {
    pub ctx: ReminderContext,
    pub sys: Arc<ManualSys>,
    pub sink: Arc<RecordingSink>,
}

/// Wednesday 2024-03-06 08:00 UTC
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap()
}

// In-memory context with a manual clock and a sink that records deliveries
pub fn spawn_app() -> TestApp {
    let sys = Arc::new(ManualSys {
        now: Mutex::new(start_time()),
    });
    let sink = Arc::new(RecordingSink::default());

    let mut ctx = ReminderContext::create_inmemory();
    ctx.sys = sys.clone();
    ctx.sink = sink.clone();

    TestApp { ctx, sys, sink }
}

pub async fn create_task(app: &TestApp, title: &str, deadline: DateTime<Utc>) -> Task {
    let task = Task::new(&ID::default(), title, Some(deadline));
    app.ctx
        .repos
        .tasks
        .insert(&task)
        .await
        .expect("To insert task");
    task
}
