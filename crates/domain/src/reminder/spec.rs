use super::{InvalidReminder, ReminderType};
use crate::date::parse_instant;
use chrono::prelude::*;
use serde_json::Value;

/// Delivery bookkeeping carried by a raw spec that was produced from an
/// already persisted reminder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryState {
    pub sent: bool,
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// A raw reminder spec as submitted by a caller, resolved once into the shape
/// it represents.
///
/// Recurring types take precedence. Otherwise `remindAt` wins over
/// `customDate`, which wins over `remindBefore`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawReminderSpec {
    Recurring {
        reminder_type: ReminderType,
        state: DeliveryState,
    },
    /// Already canonical, trusted as is
    Explicit {
        remind_at: DateTime<Utc>,
        state: DeliveryState,
    },
    /// Wall clock expression in the user's timezone
    CustomDate(String),
    /// Hours of lead time before the deadline
    RelativeHours(f64),
}

impl RawReminderSpec {
    pub fn parse(value: &Value) -> Result<Self, InvalidReminder> {
        let spec = value
            .as_object()
            .ok_or(InvalidReminder::MalformedSpec("reminder spec must be an object"))?;

        let reminder_type = match spec.get("type") {
            None | Some(Value::Null) => None,
            // Unknown types are read as one-time reminders
            Some(Value::String(reminder_type)) => reminder_type.parse::<ReminderType>().ok(),
            Some(_) => return Err(InvalidReminder::MalformedSpec("type must be a string")),
        };

        if let Some(reminder_type) = reminder_type.filter(ReminderType::is_recurring) {
            return Ok(Self::Recurring {
                reminder_type,
                state: DeliveryState {
                    // Recurring reminders never complete
                    sent: false,
                    last_sent_at: parse_last_sent_at(spec.get("lastSentAt")),
                },
            });
        }

        if let Some(remind_at) = present(spec.get("remindAt")) {
            let remind_at = remind_at
                .as_str()
                .ok_or(InvalidReminder::MalformedSpec("remindAt must be a string"))?;
            let remind_at = parse_instant(remind_at)
                .map_err(|_| InvalidReminder::UnparseableDate(remind_at.to_string()))?;
            return Ok(Self::Explicit {
                remind_at,
                state: DeliveryState {
                    sent: spec.get("sent").and_then(Value::as_bool).unwrap_or(false),
                    last_sent_at: parse_last_sent_at(spec.get("lastSentAt")),
                },
            });
        }

        if let Some(custom_date) = present(spec.get("customDate")) {
            return custom_date
                .as_str()
                .map(|custom_date| Self::CustomDate(custom_date.to_string()))
                .ok_or(InvalidReminder::MalformedSpec("customDate must be a string"));
        }

        if let Some(hours) = present(spec.get("remindBefore")) {
            let hours = match hours {
                Value::Number(hours) => hours.as_f64(),
                Value::String(hours) => hours.trim().parse::<f64>().ok(),
                _ => None,
            }
            .ok_or(InvalidReminder::MalformedSpec("remindBefore must be numeric"))?;
            return Ok(Self::RelativeHours(hours));
        }

        Err(InvalidReminder::MalformedSpec(
            "expected one of remindAt, customDate or remindBefore",
        ))
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

fn parse_last_sent_at(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|last_sent_at| parse_instant(last_sent_at).ok())
}
