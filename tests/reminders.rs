mod helpers;

use chrono::{Duration, TimeZone, Utc};
use helpers::setup::{create_task, spawn_app, start_time};
use serde_json::{json, Value};
use task_reminders_api::{
    execute, send_due_reminders, GetUpcomingRemindersUseCase, SendDueRemindersUseCase,
    SetTaskRemindersUseCase, TickGuard, TickReport,
};
use task_reminders_domain::{Reminder, ReminderType, Task};
use task_reminders_infra::ISys;

async fn set_reminders(app: &helpers::setup::TestApp, task: &Task, raw_reminders: Vec<Value>) -> Task {
    let usecase = SetTaskRemindersUseCase {
        task_id: task.id.clone(),
        raw_reminders,
        deadline: task.deadline,
        timezone: Some("Europe/Oslo".into()),
    };
    execute(usecase, &app.ctx)
        .await
        .expect("To set task reminders")
}

async fn tick(app: &helpers::setup::TestApp) -> TickReport {
    execute(SendDueRemindersUseCase {}, &app.ctx)
        .await
        .expect("Tick to succeed")
}

#[tokio::test]
async fn test_one_time_reminders_are_delivered_once() {
    let app = spawn_app();
    let deadline = Utc.with_ymd_and_hms(2024, 3, 8, 17, 0, 0).unwrap();
    let task = create_task(&app, "Submit expense report", deadline).await;

    let task = set_reminders(
        &app,
        &task,
        vec![
            json!({ "type": "one-time", "remindBefore": 24 }),
            // 10:00 in Oslo
            json!({ "customDate": "2024-03-07 10:00" }),
            json!({ "type": "one-time", "remindBefore": "24" }),
            json!({ "remindBefore": 1000 }),
        ],
    )
    .await;
    assert_eq!(
        task.reminders,
        vec![
            Reminder::one_time(Utc.with_ymd_and_hms(2024, 3, 7, 17, 0, 0).unwrap()),
            Reminder::one_time(Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap()),
        ]
    );

    // Nothing is due yet
    assert_eq!(tick(&app).await.delivered, 0);

    app.sys.set(Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap());
    assert_eq!(tick(&app).await.delivered, 1);
    assert_eq!(tick(&app).await.delivered, 0);

    app.sys.set(Utc.with_ymd_and_hms(2024, 3, 7, 17, 0, 0).unwrap());
    assert_eq!(tick(&app).await.delivered, 1);

    let delivered = app.sink.delivered();
    assert_eq!(delivered.len(), 2);
    assert!(delivered.iter().all(|(task_id, _)| task_id == &task.id));
    assert_eq!(delivered[0].1, task.reminders[1]);
    assert_eq!(delivered[1].1, task.reminders[0]);

    let stored = app.ctx.repos.tasks.find(&task.id).await.unwrap();
    assert!(stored.reminders.iter().all(|r| r.sent));
    assert_eq!(
        app.ctx
            .repos
            .send_records
            .find_by_task(&task.id)
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_daily_reminder_follows_deadline_time_of_day() {
    let app = spawn_app();
    // Anchored at 10:00 UTC
    let deadline = Utc.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap();
    let task = create_task(&app, "Practice piano", deadline).await;
    let task = set_reminders(&app, &task, vec![json!({ "type": "daily" })]).await;
    assert_eq!(task.reminders[0].reminder_type, ReminderType::Daily);

    // 08:00, before the anchor
    assert_eq!(tick(&app).await.delivered, 0);

    app.sys.set(Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap());
    assert_eq!(tick(&app).await.delivered, 1);

    app.sys.set(Utc.with_ymd_and_hms(2024, 3, 6, 22, 0, 0).unwrap());
    assert_eq!(tick(&app).await.delivered, 0);

    // Anchor reached on the next day, but the interval has not passed
    app.sys.set(Utc.with_ymd_and_hms(2024, 3, 7, 9, 59, 0).unwrap());
    assert_eq!(tick(&app).await.delivered, 0);

    app.sys.set(Utc.with_ymd_and_hms(2024, 3, 7, 10, 1, 0).unwrap());
    assert_eq!(tick(&app).await.delivered, 1);

    let stored = app.ctx.repos.tasks.find(&task.id).await.unwrap();
    assert!(!stored.reminders[0].sent);
    assert_eq!(stored.reminders[0].last_sent_at, Some(app.sys.now()));

    // Recurring reminders stop with the deadline
    app.sys.set(deadline);
    assert_eq!(tick(&app).await, TickReport::default());
    assert_eq!(app.sink.delivered().len(), 2);
}

#[tokio::test]
async fn test_recurring_reminder_fires_once_after_outage() {
    let app = spawn_app();
    let deadline = Utc.with_ymd_and_hms(2024, 3, 20, 7, 0, 0).unwrap();
    let task = create_task(&app, "Water plants", deadline).await;
    set_reminders(&app, &task, vec![json!({ "type": "daily" })]).await;

    assert_eq!(tick(&app).await.delivered, 1);

    // Nothing ran for three days
    app.sys.advance(Duration::days(3));
    assert_eq!(tick(&app).await.delivered, 1);
    assert_eq!(tick(&app).await.delivered, 0);

    app.sys.advance(Duration::hours(23));
    assert_eq!(tick(&app).await.delivered, 0);
    app.sys.advance(Duration::hours(1));
    assert_eq!(tick(&app).await.delivered, 1);
}

#[tokio::test]
async fn test_failed_delivery_is_retried_on_next_tick() {
    let app = spawn_app();
    let deadline = start_time() + Duration::days(2);
    let task = create_task(&app, "Call the bank", deadline).await;
    set_reminders(&app, &task, vec![json!({ "remindBefore": 47.5 })]).await;

    app.sys.advance(Duration::minutes(30));
    app.sink.set_failing(true);
    let report = tick(&app).await;
    assert_eq!(report.failed, 1);
    assert!(app.sink.delivered().is_empty());
    let stored = app.ctx.repos.tasks.find(&task.id).await.unwrap();
    assert!(!stored.reminders[0].sent);

    app.sink.set_failing(false);
    app.sys.advance(Duration::minutes(5));
    let report = tick(&app).await;
    assert_eq!(report.failed, 0);
    assert_eq!(report.delivered, 1);
    assert_eq!(app.sink.delivered().len(), 1);
}

#[tokio::test]
async fn test_upcoming_reminders() {
    let app = spawn_app();
    let deadline = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
    let task = create_task(&app, "Renew lease", deadline).await;
    set_reminders(
        &app,
        &task,
        vec![json!({ "type": "weekly" }), json!({ "remindBefore": 48 })],
    )
    .await;

    let usecase = GetUpcomingRemindersUseCase {
        task_id: task.id.clone(),
    };
    let upcoming = execute(usecase, &app.ctx).await.unwrap();
    let triggers = upcoming
        .iter()
        .map(|r| r.next_trigger_at)
        .collect::<Vec<_>>();
    assert_eq!(
        triggers,
        vec![
            Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 18, 12, 0, 0).unwrap(),
        ]
    );
}

#[tokio::test]
async fn test_ticks_do_not_overlap() {
    let app = spawn_app();
    let deadline = start_time() + Duration::days(3);
    let task = create_task(&app, "Pack for trip", deadline).await;
    set_reminders(&app, &task, vec![json!({ "remindBefore": 71 })]).await;
    app.sys.advance(Duration::hours(2));

    let guard = TickGuard::default();
    let (first, second) = tokio::join!(
        send_due_reminders(&app.ctx, &guard),
        send_due_reminders(&app.ctx, &guard)
    );
    let reports = vec![first, second]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
    let delivered = reports.iter().map(|r| r.delivered).sum::<usize>();
    assert_eq!(delivered, 1);
    assert_eq!(app.sink.delivered().len(), 1);
}
