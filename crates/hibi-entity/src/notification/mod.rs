//! Notification payloads and topics.

pub mod payload;
pub mod topic;

pub use payload::NotificationPayload;
pub use topic::NotificationTopic;
