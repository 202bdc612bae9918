//! # hibi-service
//!
//! Business services over the repositories and the pipeline:
//!
//! - [`reminder::ReminderService`] — reminder settings, keeps the time
//!   index following the relational source of truth
//! - [`device::DeviceService`] — device push-token lifecycle
//! - [`notification::NotificationService`] — topic broadcasts through
//!   the delivery queue
//!
//! The services reach storage through the seams in [`store`], so their
//! lifecycle decisions are testable without a database.

pub mod device;
pub mod notification;
pub mod reminder;
pub mod store;

pub use device::DeviceService;
pub use notification::{NotificationService, PayloadCatalog};
pub use reminder::ReminderService;
