use crate::shared::usecase::UseCase;
use chrono::prelude::*;
use task_reminders_domain::{get_due, mark_sent, Reminder, SendRecord, Task};
use task_reminders_infra::{CommitDeliveryError, ReminderContext};
use tracing::{error, info, warn};

/// Delivers every reminder that is due right now. One run of this use case
/// is one tick of the send reminders job.
///
/// A reminder whose delivery fails stays due and is retried on the next
/// tick.
#[derive(Debug)]
pub struct SendDueRemindersUseCase {}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// Number of reminders that were checked
    pub evaluated: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Due reminders that another tick already delivered
    pub skipped_duplicates: usize,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

enum Outcome {
    Delivered,
    Failed,
    Duplicate,
}

#[async_trait::async_trait]
impl UseCase for SendDueRemindersUseCase {
    type Response = TickReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        let tasks = ctx
            .repos
            .tasks
            .find_active(&now)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let mut report = TickReport::default();
        for task in &tasks {
            report.evaluated += task.reminders.len();
            for reminder in get_due(&task.reminders, task.deadline.as_ref(), &now) {
                match deliver(task, &reminder, &now, ctx).await {
                    Outcome::Delivered => report.delivered += 1,
                    Outcome::Failed => report.failed += 1,
                    Outcome::Duplicate => report.skipped_duplicates += 1,
                }
            }
        }

        if report.delivered > 0 || report.failed > 0 {
            info!(
                delivered = report.delivered,
                failed = report.failed,
                skipped_duplicates = report.skipped_duplicates,
                "Sent due reminders"
            );
        }

        Ok(report)
    }
}

/// `now` is the instant the reminder was found due at. Delivery window and
/// `lastSentAt` are derived from it, never from a later clock reading.
async fn deliver(
    task: &Task,
    reminder: &Reminder,
    now: &DateTime<Utc>,
    ctx: &ReminderContext,
) -> Outcome {
    let record = SendRecord::new(&task.id, reminder, now);

    match ctx.repos.send_records.find(&record.key()).await {
        Ok(None) => (),
        Ok(Some(_)) => return Outcome::Duplicate,
        Err(e) => {
            error!(task_id = %task.id, "Unable to check send records: {:?}", e);
            return Outcome::Failed;
        }
    }

    if let Err(e) = ctx.sink.deliver(task, reminder).await {
        warn!(
            task_id = %task.id,
            reminder = %record.reminder_key,
            "Unable to deliver reminder, retrying on next tick: {:?}",
            e
        );
        return Outcome::Failed;
    }

    let delivered = mark_sent(reminder, now);
    match ctx
        .repos
        .tasks
        .commit_delivery(&task.id, &delivered, &record)
        .await
    {
        Ok(()) => Outcome::Delivered,
        Err(CommitDeliveryError::AlreadyDelivered) => {
            warn!(
                task_id = %task.id,
                reminder = %record.reminder_key,
                window = %record.window,
                "Reminder was delivered concurrently by another tick"
            );
            Outcome::Duplicate
        }
        Err(e) => {
            // The sink has already been called, the next tick can send this again
            error!(
                task_id = %task.id,
                reminder = %record.reminder_key,
                "Delivered reminder could not be marked as sent: {:?}",
                e
            );
            Outcome::Failed
        }
    }
}
