mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{CommitDeliveryError, ISendRecordRepo, ITaskRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, RealSys};

#[derive(Clone)]
pub struct ReminderContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub sink: Arc<dyn IReminderSink>,
}

impl ReminderContext {
    fn create(config: Config) -> Self {
        let sink: Arc<dyn IReminderSink> = match &config.webhook_url {
            Some(url) => Arc::new(WebhookReminderSink::new(url, &config.webhook_key)),
            None => Arc::new(LogReminderSink {}),
        };
        Self {
            repos: Repos::create_inmemory(),
            config,
            sys: Arc::new(RealSys {}),
            sink,
        }
    }

    /// Context backed by in-memory repositories that only logs reminders
    pub fn create_inmemory() -> Self {
        let config = Config::new();
        Self {
            repos: Repos::create_inmemory(),
            config,
            sys: Arc::new(RealSys {}),
            sink: Arc::new(LogReminderSink {}),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> ReminderContext {
    ReminderContext::create(Config::new())
}
