//! Per-attempt deadline enforcement.
//!
//! The operation is spawned onto the runtime and only the *wait* is bounded.
//! When the deadline fires the attempt fails with [`ErrorKind::Timeout`] and
//! the task is detached, not aborted: the remote job (and whatever local
//! resources the future holds, such as an open HTTP connection) may keep
//! running in the background until it finishes on its own. Its eventual
//! result is discarded.
//!
//! [`ErrorKind::Timeout`]: crate::resilience::ErrorKind::Timeout

use std::future::Future;
use std::time::Duration;
use tokio::time;

use crate::resilience::error::CallError;

/// Race `operation` against `deadline`.
pub async fn run_with_deadline<Fut, T>(operation: Fut, deadline: Duration) -> Result<T, CallError>
where
    Fut: Future<Output = Result<T, CallError>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(operation);

    match time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(CallError::other(format!(
            "Operation task failed: {}",
            join_error
        ))),
        Err(_) => {
            tracing::debug!(
                deadline_ms = deadline.as_millis() as u64,
                "Attempt deadline elapsed; operation left running in background"
            );
            Err(CallError::timeout(deadline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::ErrorKind;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_fast_operation_passes_through() {
        let result = run_with_deadline(async { Ok::<_, CallError>(7) }, Duration::from_secs(1)).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_error_passes_through() {
        let result: Result<(), _> = run_with_deadline(
            async { Err(CallError::authentication("Unauthorized")) },
            Duration::from_secs(1),
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.message(), "Unauthorized");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_operation_times_out_but_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let result = run_with_deadline(
            async move {
                time::sleep(Duration::from_secs(10)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, CallError>("late")
            },
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Timeout);
        assert!(!finished.load(Ordering::SeqCst));

        // The detached task is not cancelled by the timeout.
        time::sleep(Duration::from_secs(20)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_operation_is_reported() {
        let explode = true;
        let result = run_with_deadline(
            async move {
                if explode {
                    panic!("boom");
                }
                Ok::<(), CallError>(())
            },
            Duration::from_secs(1),
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.message().starts_with("Operation task failed"));
    }
}
