mod date;
mod evaluator;
mod marker;
mod normalizer;
mod reminder;
mod send_record;
mod shared;
mod task;

pub use date::{
    anchor_on, format_instant, parse_instant, parse_timezone, parse_wall_clock,
    same_time_of_day, DateError,
};
pub use evaluator::{delivery_window, get_due, next_trigger_at, reminder_state, ReminderState};
pub use marker::mark_sent;
pub use normalizer::{normalize, normalize_for_task};
pub use reminder::{
    build_one_time_from_date, build_one_time_from_hours, build_recurring, DeliveryState,
    InvalidReminder, RawReminderSpec, Reminder, ReminderType, DAILY_INTERVAL_HOURS,
    WEEKLY_INTERVAL_HOURS,
};
pub use send_record::{SendRecord, SendRecordKey};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use task::Task;
