mod webhook;

use task_reminders_domain::{format_instant, Reminder, Task};
use tracing::info;
pub use webhook::{ReminderWebhookPayload, WebhookReminderSink};

/// Where due reminders are delivered. How the notification is rendered and
/// transported is up to the implementation, it only reports success or
/// failure.
#[async_trait::async_trait]
pub trait IReminderSink: Send + Sync {
    async fn deliver(&self, task: &Task, reminder: &Reminder) -> anyhow::Result<()>;
}

/// Sink used when no delivery target is configured
pub struct LogReminderSink {}

#[async_trait::async_trait]
impl IReminderSink for LogReminderSink {
    async fn deliver(&self, task: &Task, reminder: &Reminder) -> anyhow::Result<()> {
        info!(
            task_id = %task.id,
            title = %task.title,
            deadline = ?task.deadline.as_ref().map(format_instant),
            reminder = %reminder.key(),
            "Reminder is due"
        );
        Ok(())
    }
}
