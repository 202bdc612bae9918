//! # hibi-push
//!
//! Push-notification transports behind the
//! [`hibi_core::traits::push::PushTransport`] trait:
//!
//! - **fcm**: Firebase Cloud Messaging over HTTP
//! - **log**: records sends to the log (development and tests)

pub mod fcm;
pub mod log;
pub mod manager;

pub use manager::PushManager;
