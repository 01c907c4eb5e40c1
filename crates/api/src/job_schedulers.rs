use crate::{
    reminders::send_due_reminders::{SendDueRemindersUseCase, TickReport},
    shared::usecase::execute,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use task_reminders_infra::ReminderContext;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{error, info, warn};

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Run-in-progress flag shared by everyone that runs send reminders ticks
#[derive(Debug, Clone, Default)]
pub struct TickGuard(Arc<AtomicBool>);

struct RunningTick(Arc<AtomicBool>);

impl TickGuard {
    fn try_start(&self) -> Option<RunningTick> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningTick(self.0.clone()))
    }
}

impl Drop for RunningTick {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs a single send reminders tick. Returns `None` without doing anything
/// when another tick guarded by `guard` is still running, or when the tick
/// failed.
pub async fn send_due_reminders(ctx: &ReminderContext, guard: &TickGuard) -> Option<TickReport> {
    let _running = match guard.try_start() {
        Some(running) => running,
        None => {
            warn!("Previous send reminders tick is still running, skipping this one");
            return None;
        }
    };

    execute(SendDueRemindersUseCase {}, ctx).await.ok()
}

/// Handle to the background job started by [`start_send_reminders_job`].
/// Dropping it stops the job after the current tick.
pub struct ReminderJobHandle {
    ctx: ReminderContext,
    guard: TickGuard,
    shutdown: watch::Sender<bool>,
    job: JoinHandle<()>,
}

impl ReminderJobHandle {
    /// Runs a tick right away, unless the job is in the middle of one
    pub async fn run_now(&self) -> Option<TickReport> {
        send_due_reminders(&self.ctx, &self.guard).await
    }

    /// Stops the job between ticks. A tick that is in progress is allowed
    /// to complete.
    pub async fn shutdown(self) {
        // The job is gone already if nobody is listening
        let _ = self.shutdown.send(true);
        if let Err(e) = self.job.await {
            error!("Send reminders job did not stop cleanly: {:?}", e);
        }
    }
}

/// Delivers due reminders every `tick_interval`, starting at the next whole
/// minute. A tick that runs longer than the interval causes the ticks it
/// overlaps with to be skipped.
pub fn start_send_reminders_job(ctx: ReminderContext) -> ReminderJobHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);
    let guard = TickGuard::default();

    let job_ctx = ctx.clone();
    let job_guard = guard.clone();
    let job = tokio::spawn(async move {
        let now = job_ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);
        let period = job_ctx.config.tick_interval.max(Duration::from_secs(1));

        let mut ticks = interval_at(start, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = period.as_secs(), "Send reminders job started");

        loop {
            tokio::select! {
                _ = ticks.tick() => {}
                _ = shutdown_rx.changed() => break,
            }
            send_due_reminders(&job_ctx, &job_guard).await;
        }

        info!("Send reminders job stopped");
    });

    ReminderJobHandle {
        ctx,
        guard,
        shutdown,
        job,
    }
}
