//! Isolation wrapper for background tasks.
//!
//! Every future the pipeline spawns goes through [`spawn_isolated`], so a
//! failing or panicking task is always observed in the logs and can never
//! take the runtime down or vanish silently.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::error;

use hibi_core::result::AppResult;

/// Spawn a fallible background task whose outcome is always observed.
///
/// An `Err` result is logged at error level; a panic is caught and logged
/// the same way. The returned handle is for tests and shutdown sequencing,
/// callers are free to drop it.
pub fn spawn_isolated<F>(name: &'static str, fut: F) -> JoinHandle<()>
where
    F: Future<Output = AppResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(task = name, error = %e, "Background task failed");
            }
            Err(panic) => {
                error!(task = name, panic = panic_message(&panic), "Background task panicked");
            }
        }
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use hibi_core::error::AppError;

    use super::*;

    #[tokio::test]
    async fn test_ok_task_completes() {
        let handle = spawn_isolated("ok-task", async { Ok(()) });
        handle.await.expect("join");
    }

    #[tokio::test]
    async fn test_err_task_is_contained() {
        let handle = spawn_isolated("err-task", async { Err(AppError::internal("boom")) });
        // The error is logged, not propagated.
        handle.await.expect("join");
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let handle = spawn_isolated("panic-task", async { panic!("kaboom") });
        handle.await.expect("join");
    }
}
