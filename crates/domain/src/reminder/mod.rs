mod builders;
mod spec;

use crate::date::format_instant;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

pub use builders::{build_one_time_from_date, build_one_time_from_hours, build_recurring};
pub use spec::{DeliveryState, RawReminderSpec};

pub const DAILY_INTERVAL_HOURS: i64 = 24;
pub const WEEKLY_INTERVAL_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderType {
    OneTime,
    Daily,
    Weekly,
}

impl ReminderType {
    /// The fixed cadence of a recurring type, `None` for `OneTime`
    pub fn interval_hours(&self) -> Option<i64> {
        match self {
            Self::OneTime => None,
            Self::Daily => Some(DAILY_INTERVAL_HOURS),
            Self::Weekly => Some(WEEKLY_INTERVAL_HOURS),
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.interval_hours().is_some()
    }
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::OneTime => "one-time",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ReminderType {
    type Err = InvalidReminder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "one-time" | "onetime" | "once" => Ok(Self::OneTime),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            _ => Err(InvalidReminder::UnknownType(s.to_string())),
        }
    }
}

/// Reasons for a reminder spec to be rejected. Normalization drops the spec
/// and moves on, these are never surfaced to the caller as failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidReminder {
    #[error("Malformed reminder spec: {0}")]
    MalformedSpec(&'static str),
    #[error("Unknown reminder type: `{0}`")]
    UnknownType(String),
    #[error("Unparseable date: `{0}`")]
    UnparseableDate(String),
    #[error("Invalid timezone: `{0}`")]
    InvalidTimezone(String),
    #[error("Lead time must be a positive number of hours")]
    NonPositiveLeadTime,
    #[error("A reminder needs a deadline")]
    MissingDeadline,
    #[error("The reminder would fire in the past")]
    NotInFuture,
    #[error("The reminder must fire before the deadline")]
    NotBeforeDeadline,
    #[error("`{0}` is not a recurring reminder type")]
    NotRecurring(ReminderType),
    #[error("A full cycle of {interval_hours} hours does not fit before the deadline")]
    CycleDoesNotFit { interval_hours: i64 },
}

/// A canonical reminder attached to a task deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    /// Only set for `OneTime`, always strictly before the deadline
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_instant")]
    pub remind_at: Option<DateTime<Utc>>,
    /// Only set for recurring types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_hours: Option<i64>,
    /// Terminal flag for `OneTime`. Recurring reminders never complete so this
    /// stays false for them.
    #[serde(default)]
    pub sent: bool,
    /// Last successful delivery, drives the recurring cadence
    #[serde(default, with = "iso_instant")]
    pub last_sent_at: Option<DateTime<Utc>>,
}

impl Reminder {
    pub fn one_time(remind_at: DateTime<Utc>) -> Self {
        Self {
            reminder_type: ReminderType::OneTime,
            remind_at: Some(remind_at),
            interval_hours: None,
            sent: false,
            last_sent_at: None,
        }
    }

    /// Returns `None` when `reminder_type` is not recurring
    pub fn recurring(reminder_type: ReminderType) -> Option<Self> {
        reminder_type.interval_hours().map(|interval_hours| Self {
            reminder_type,
            remind_at: None,
            interval_hours: Some(interval_hours),
            sent: false,
            last_sent_at: None,
        })
    }

    /// Identity of the reminder within its task. It only depends on the
    /// canonical shape, so it survives renormalization.
    pub fn key(&self) -> String {
        match (self.reminder_type, &self.remind_at) {
            (ReminderType::OneTime, Some(remind_at)) => {
                format!("{}@{}", self.reminder_type, format_instant(remind_at))
            }
            (reminder_type, _) => reminder_type.to_string(),
        }
    }
}

mod iso_instant {
    use crate::date::{format_instant, parse_instant};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => serializer.serialize_str(&format_instant(instant)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|value| parse_instant(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}
