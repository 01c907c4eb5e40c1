use crate::shared::usecase::UseCase;
use chrono::prelude::*;
use task_reminders_domain::{next_trigger_at, Reminder, ID};
use task_reminders_infra::ReminderContext;

/// Lists the reminders of a task that are going to fire, ordered by when
/// they fire next
#[derive(Debug)]
pub struct GetUpcomingRemindersUseCase {
    pub task_id: ID,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingReminder {
    pub reminder: Reminder,
    pub next_trigger_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
}

#[async_trait::async_trait]
impl UseCase for GetUpcomingRemindersUseCase {
    type Response = Vec<UpcomingReminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetUpcomingReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let task = ctx
            .repos
            .tasks
            .find(&self.task_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.task_id.clone()))?;

        let now = ctx.sys.now();
        let deadline = match task.deadline {
            Some(deadline) if task.is_active(&now) => deadline,
            _ => return Ok(Vec::new()),
        };

        let mut upcoming = task
            .reminders
            .into_iter()
            .filter_map(|reminder| {
                next_trigger_at(&reminder, &deadline, &now).map(|next_trigger_at| UpcomingReminder {
                    reminder,
                    next_trigger_at,
                })
            })
            .collect::<Vec<_>>();
        upcoming.sort_by_key(|r| r.next_trigger_at);

        Ok(upcoming)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;
    use task_reminders_domain::{mark_sent, ReminderType, Task};
    use task_reminders_infra::ISys;

    pub struct StaticTimeSys1 {}
    impl ISys for StaticTimeSys1 {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap()
        }
    }

    #[tokio::test]
    async fn lists_reminders_by_next_trigger() {
        let mut ctx = ReminderContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys1 {});
        let now = ctx.sys.now();

        let deadline = Utc.with_ymd_and_hms(2024, 3, 20, 18, 0, 0).unwrap();
        let mut task = Task::new(&ID::default(), "Book flights", Some(deadline));
        let in_two_days = Reminder::one_time(now + Duration::days(2));
        let delivered = mark_sent(&Reminder::one_time(now - Duration::hours(1)), &now);
        let daily = Reminder::recurring(ReminderType::Daily).unwrap();
        task.reminders = vec![in_two_days.clone(), delivered, daily.clone()];
        ctx.repos.tasks.insert(&task).await.unwrap();

        let mut usecase = GetUpcomingRemindersUseCase {
            task_id: task.id.clone(),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(
            res,
            vec![
                UpcomingReminder {
                    reminder: daily,
                    next_trigger_at: Utc.with_ymd_and_hms(2024, 3, 6, 18, 0, 0).unwrap(),
                },
                UpcomingReminder {
                    reminder: in_two_days,
                    next_trigger_at: now + Duration::days(2),
                },
            ]
        );

        task.completed = true;
        ctx.repos.tasks.save(&task).await.unwrap();
        assert!(usecase.execute(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_task() {
        let ctx = ReminderContext::create_inmemory();
        let task_id = ID::default();
        let mut usecase = GetUpcomingRemindersUseCase {
            task_id: task_id.clone(),
        };
        assert_eq!(usecase.execute(&ctx).await, Err(UseCaseError::NotFound(task_id)));
    }
}
