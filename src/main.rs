//! Hibi Server — scheduled notification dispatch for the diary backend.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use hibi_core::config::AppConfig;
use hibi_core::error::AppError;
use hibi_core::traits::time_index::TimeIndex;
use hibi_delivery::fanout::FanOutSender;
use hibi_delivery::queue::DeliveryQueue;
use hibi_delivery::sender::SenderDispatch;
use hibi_delivery::source::{DeviceTokenSource, PayloadSource, RecipientSource, ScheduleSource};
use hibi_index::manager::TimeIndexManager;
use hibi_push::manager::PushManager;
use hibi_service::store::{DeviceStore, RecipientStore, ScheduleStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("HIBI_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Hibi v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db = hibi_database::connection::DatabasePool::connect(&config.database).await?;
    hibi_database::migration::run_migrations(db.pool()).await?;

    // ── Time index and push transport ─────────────────────────────
    let index = Arc::new(TimeIndexManager::new(&config.index).await?);
    let push = Arc::new(PushManager::new(&config.push)?);

    // ── Repositories ──────────────────────────────────────────────
    let recipient_repo = Arc::new(
        hibi_database::repositories::recipient::RecipientRepository::new(db.pool().clone()),
    );
    let schedule_repo = Arc::new(
        hibi_database::repositories::reminder::ReminderScheduleRepository::new(db.pool().clone()),
    );
    let device_repo = Arc::new(
        hibi_database::repositories::device::DeviceTokenRepository::new(db.pool().clone()),
    );
    let delivery_repo =
        hibi_database::repositories::delivery::DeliveryRepository::new(db.pool().clone());

    // ── Pipeline ──────────────────────────────────────────────────
    let queue = Arc::new(DeliveryQueue::new(delivery_repo, config.worker.max_attempts));
    let payloads = Arc::new(hibi_service::notification::PayloadCatalog::new());

    let fanout = Arc::new(FanOutSender::new(
        Arc::clone(&recipient_repo) as Arc<dyn RecipientSource>,
        Arc::clone(&device_repo) as Arc<dyn DeviceTokenSource>,
        Arc::clone(&payloads) as Arc<dyn PayloadSource>,
        Arc::clone(&push) as _,
    ));

    // ── Services ──────────────────────────────────────────────────
    let reminder_service = Arc::new(hibi_service::reminder::ReminderService::new(
        Arc::clone(&recipient_repo) as Arc<dyn RecipientStore>,
        Arc::clone(&schedule_repo) as Arc<dyn ScheduleStore>,
        Arc::clone(&index) as Arc<dyn TimeIndex>,
    ));
    let device_service = Arc::new(hibi_service::device::DeviceService::new(
        Arc::clone(&device_repo) as Arc<dyn DeviceStore>,
    ));
    let notification_service = Arc::new(hibi_service::notification::NotificationService::new(
        Arc::clone(&queue),
        Arc::clone(&payloads) as Arc<dyn PayloadSource>,
    ));

    // A fresh index (or a flushed Redis) must reflect the schedules.
    reminder_service.rebuild_index().await?;

    // ── Shutdown channel ──────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Poller and delivery runner ────────────────────────────────
    let (scheduler, runner_handle) = if config.worker.enabled {
        let sender =
            SenderDispatch::from_config(&config.worker, Arc::clone(&queue), Arc::clone(&fanout))?;

        let poller = Arc::new(hibi_worker::poller::ReminderPoller::new(
            Arc::clone(&index) as Arc<dyn TimeIndex>,
            Arc::clone(&schedule_repo) as Arc<dyn ScheduleSource>,
            Arc::new(sender),
            config.worker.window_minutes,
        ));

        let scheduler = hibi_worker::poller::PollScheduler::new().await?;
        scheduler
            .register_poll(poller, &config.worker.poll_cron)
            .await?;
        scheduler.start().await?;

        let worker_id = format!("worker-{}", &uuid::Uuid::new_v4().to_string()[..8]);
        let runner = hibi_worker::runner::DeliveryRunner::new(
            Arc::clone(&queue),
            Arc::clone(&fanout),
            config.worker.clone(),
            worker_id,
        );

        let runner_cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            runner.run(runner_cancel).await;
        });

        tracing::info!("Poller and delivery runner started");
        (Some(scheduler), Some(handle))
    } else {
        tracing::info!("Background worker disabled");
        (None, None)
    };

    // ── HTTP server ───────────────────────────────────────────────
    let app_state = hibi_api::state::AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        index: Arc::clone(&index),
        queue: Arc::clone(&queue),
        reminder_service,
        device_service,
        notification_service,
    };

    let app = hibi_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Hibi server listening on {addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Wait for background tasks ─────────────────────────────────
    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await?;
    }
    if let Some(handle) = runner_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    db.close().await;
    tracing::info!("Hibi server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
