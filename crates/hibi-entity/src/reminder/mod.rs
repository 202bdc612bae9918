//! Reminder schedule entity.

pub mod model;

pub use model::ReminderSchedule;
