use crate::shared::usecase::UseCase;
use chrono::prelude::*;
use serde_json::{Map, Value};
use task_reminders_domain::{
    format_instant, normalize_for_task, parse_instant, parse_timezone, Reminder, ReminderType,
    Task, ID,
};
use task_reminders_infra::ReminderContext;

/// Replaces the reminders of a `Task` with the normalized form of the
/// submitted raw reminder specs
#[derive(Debug)]
pub struct SetTaskRemindersUseCase {
    pub task_id: ID,
    pub raw_reminders: Vec<Value>,
    /// The deadline of the task after this change. `None` removes the
    /// deadline and therefore every reminder.
    pub deadline: Option<DateTime<Utc>>,
    /// IANA timezone the user expresses dates in. Keeps the timezone of the
    /// task when not given.
    pub timezone: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidTimezone(String),
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for SetTaskRemindersUseCase {
    type Response = Task;

    type Error = UseCaseError;

    const NAME: &'static str = "SetTaskReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let mut task = match ctx.repos.tasks.find(&self.task_id).await {
            Some(task) => task,
            None => return Err(UseCaseError::NotFound(self.task_id.clone())),
        };

        if let Some(timezone) = &self.timezone {
            task.timezone = parse_timezone(timezone)
                .map_err(|_| UseCaseError::InvalidTimezone(timezone.clone()))?;
        }

        let prior_deadline = task.deadline;
        task.deadline = self.deadline;
        task.reminders = match task.deadline {
            Some(deadline) => {
                let raw_reminders = self
                    .raw_reminders
                    .iter()
                    .map(|raw| with_delivery_state(raw, &task.reminders))
                    .collect::<Vec<_>>();
                normalize_for_task(
                    &raw_reminders,
                    deadline,
                    task.timezone.name(),
                    prior_deadline,
                    ctx.sys.now(),
                )
            }
            None => Vec::new(),
        };

        ctx.repos
            .tasks
            .save(&task)
            .await
            .map(|_| task)
            .map_err(|_| UseCaseError::StorageError)
    }
}

/// The stored delivery state is the source of truth. A raw spec that refers
/// to an existing reminder gets the state of that reminder, so resubmitting
/// a reminder that was already delivered does not deliver it again.
fn with_delivery_state(raw: &Value, existing: &[Reminder]) -> Value {
    let spec = match raw.as_object() {
        Some(spec) => spec,
        None => return raw.clone(),
    };
    let stored = match reminder_key(spec).and_then(|key| existing.iter().find(|r| r.key() == key)) {
        Some(stored) => stored,
        None => return raw.clone(),
    };

    let mut spec = spec.clone();
    spec.insert("sent".into(), Value::Bool(stored.sent));
    spec.insert(
        "lastSentAt".into(),
        stored
            .last_sent_at
            .as_ref()
            .map(|last_sent_at| Value::String(format_instant(last_sent_at)))
            .unwrap_or(Value::Null),
    );
    Value::Object(spec)
}

fn reminder_key(spec: &Map<String, Value>) -> Option<String> {
    let recurring = spec
        .get("type")
        .and_then(Value::as_str)
        .and_then(|reminder_type| reminder_type.parse::<ReminderType>().ok())
        .filter(ReminderType::is_recurring);
    if let Some(reminder_type) = recurring {
        return Reminder::recurring(reminder_type).map(|reminder| reminder.key());
    }

    spec.get("remindAt")
        .and_then(Value::as_str)
        .and_then(|remind_at| parse_instant(remind_at).ok())
        .map(|remind_at| Reminder::one_time(remind_at).key())
}
