//! Notification payload model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::topic::NotificationTopic;

/// The content delivered to every recipient of a topic.
///
/// Immutable once constructed; shared by reference (`Arc`) across all
/// recipients of a broadcast. `data` is free-form key/value context
/// delivered alongside title/body (e.g. a deep-link target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// The topic that produced this payload.
    pub topic: NotificationTopic,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Free-form key/value context.
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl NotificationPayload {
    /// Create a payload with no extra data.
    pub fn new(
        topic: NotificationTopic,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            topic,
            title: title.into(),
            body: body.into(),
            data: HashMap::new(),
        }
    }

    /// Attach a key/value pair to the payload data.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}
