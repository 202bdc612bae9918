//! Delivery queue entities and wire events.

pub mod event;
pub mod model;
pub mod status;

pub use event::DueReminder;
pub use model::{Delivery, DeliveryKind};
pub use status::DeliveryStatus;
