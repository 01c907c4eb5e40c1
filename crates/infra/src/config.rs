use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// How often the scheduler looks for due reminders
    pub tick_interval: Duration,
    /// Where reminders are delivered. Reminders are only logged when this
    /// is not set.
    pub webhook_url: Option<String>,
    /// Sent along with every webhook request so that the receiver can
    /// verify the sender
    pub webhook_key: String,
}

const DEFAULT_TICK_INTERVAL_SECS: u64 = 5 * 60;

impl Config {
    pub fn new() -> Self {
        let tick_interval_secs = match std::env::var("REMINDER_TICK_INTERVAL_SECS") {
            Ok(secs) => match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(
                        "The given REMINDER_TICK_INTERVAL_SECS: {} is not valid, falling back to the default: {}.",
                        secs, DEFAULT_TICK_INTERVAL_SECS
                    );
                    DEFAULT_TICK_INTERVAL_SECS
                }
            },
            Err(_) => DEFAULT_TICK_INTERVAL_SECS,
        };

        let webhook_url = std::env::var("REMINDER_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        if webhook_url.is_none() {
            info!("Did not find REMINDER_WEBHOOK_URL environment variable. Reminders will only be logged.");
        }
        let webhook_key = std::env::var("REMINDER_WEBHOOK_KEY").unwrap_or_default();

        Self {
            tick_interval: Duration::from_secs(tick_interval_secs),
            webhook_url,
            webhook_key,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
