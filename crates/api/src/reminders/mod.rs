pub mod get_upcoming_reminders;
pub mod send_due_reminders;
pub mod set_task_reminders;
