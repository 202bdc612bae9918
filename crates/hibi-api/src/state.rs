//! Application state shared across all handlers.

use std::sync::Arc;

use hibi_core::config::AppConfig;
use hibi_database::connection::DatabasePool;
use hibi_delivery::queue::DeliveryQueue;
use hibi_index::manager::TimeIndexManager;
use hibi_service::device::DeviceService;
use hibi_service::notification::NotificationService;
use hibi_service::reminder::ReminderService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool wrapper.
    pub db: DatabasePool,
    /// Time index (memory or Redis).
    pub index: Arc<TimeIndexManager>,
    /// Durable delivery queue.
    pub queue: Arc<DeliveryQueue>,
    /// Reminder settings service.
    pub reminder_service: Arc<ReminderService>,
    /// Device token service.
    pub device_service: Arc<DeviceService>,
    /// Topic broadcast service.
    pub notification_service: Arc<NotificationService>,
}
