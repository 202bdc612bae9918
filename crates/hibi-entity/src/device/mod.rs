//! Device token entity.

pub mod model;
pub mod platform;

pub use model::DeviceToken;
pub use platform::DevicePlatform;
