//! # hibi-worker
//!
//! The background half of the reminder pipeline:
//!
//! - [`poller::ReminderPoller`] ticks on a cron schedule, queries the
//!   time index for due reminders, and hands them to the configured
//!   sender.
//! - [`runner::DeliveryRunner`] drains the durable delivery queue with
//!   bounded concurrency and runs the fan-out per delivery.

pub mod poller;
pub mod runner;

pub use poller::{PollScheduler, ReminderPoller};
pub use runner::DeliveryRunner;
