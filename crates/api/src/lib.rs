mod job_schedulers;
pub mod reminders;
mod shared;

pub use job_schedulers::{
    get_start_delay, send_due_reminders, start_send_reminders_job, ReminderJobHandle, TickGuard,
};
pub use reminders::{
    get_upcoming_reminders::{GetUpcomingRemindersUseCase, UpcomingReminder},
    send_due_reminders::{SendDueRemindersUseCase, TickReport},
    set_task_reminders::SetTaskRemindersUseCase,
};
pub use shared::usecase::{execute, UseCase};
