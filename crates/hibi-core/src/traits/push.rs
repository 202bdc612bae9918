//! Push-transport abstraction.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::result::AppResult;

/// The last external hop to a device's push service.
///
/// The call is opaque and fallible; callers treat a failure for one token
/// as isolated from every other token. No delivery guarantee beyond
/// best-effort is implied.
#[async_trait]
pub trait PushTransport: Send + Sync + fmt::Debug {
    /// Send one notification to one device token.
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> AppResult<()>;
}
