mod telemetry;

use task_reminders_api::start_send_reminders_job;
use task_reminders_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("task_reminders".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context();
    let job = start_send_reminders_job(context);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    job.shutdown().await;

    Ok(())
}
