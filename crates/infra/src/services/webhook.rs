use super::IReminderSink;
use serde::Serialize;
use task_reminders_domain::{format_instant, Reminder, Task, ID};
use tracing::error;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderWebhookPayload<'a> {
    pub task_id: &'a ID,
    pub title: &'a str,
    pub deadline: Option<String>,
    pub timezone: String,
    pub reminder: &'a Reminder,
}

impl<'a> ReminderWebhookPayload<'a> {
    pub fn new(task: &'a Task, reminder: &'a Reminder) -> Self {
        Self {
            task_id: &task.id,
            title: &task.title,
            deadline: task.deadline.as_ref().map(format_instant),
            timezone: task.timezone.name().to_string(),
            reminder,
        }
    }
}

/// Posts every due reminder as json to a configured url
pub struct WebhookReminderSink {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl WebhookReminderSink {
    pub fn new(url: &str, key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            key: key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl IReminderSink for WebhookReminderSink {
    async fn deliver(&self, task: &Task, reminder: &Reminder) -> anyhow::Result<()> {
        let res = self
            .client
            .post(&self.url)
            .header("task-reminders-webhook-key", &self.key)
            .json(&ReminderWebhookPayload::new(task, reminder))
            .send()
            .await
            .map_err(|e| {
                error!("Error informing client of reminder: {:?}", e);
                e
            })?;
        res.error_for_status()?;
        Ok(())
    }
}
