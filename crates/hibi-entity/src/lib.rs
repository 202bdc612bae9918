//! # hibi-entity
//!
//! Domain entity models for the Hibi reminder pipeline: notification
//! payloads and topics, recipients (a user's subscription to a topic),
//! reminder schedules, device tokens, and queued deliveries.

pub mod delivery;
pub mod device;
pub mod notification;
pub mod recipient;
pub mod reminder;
