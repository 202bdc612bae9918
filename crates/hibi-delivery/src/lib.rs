//! # hibi-delivery
//!
//! The delivery half of the reminder pipeline: resolving who a due
//! reminder belongs to, fanning it out to every registered device, and
//! the durable queue boundary that decouples the poller from the
//! consumer.
//!
//! Two sender strategies implement [`sender::ReminderSender`]:
//!
//! - [`direct::DirectSender`] fans out in-process from the poll tick
//! - [`queued::QueuedSender`] publishes to the durable delivery queue
//!
//! Callers hold a [`sender::SenderDispatch`] and never inspect which
//! strategy is active.

pub mod direct;
pub mod fanout;
pub mod isolate;
pub mod queue;
pub mod queued;
pub mod sender;
pub mod source;

pub use fanout::{FanOutOutcome, FanOutSender};
pub use isolate::spawn_isolated;
pub use queue::DeliveryQueue;
pub use sender::{ReminderSender, SenderDispatch};
