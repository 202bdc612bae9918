//! HTTP handlers.

pub mod broadcast;
pub mod device;
pub mod health;
pub mod reminder;
