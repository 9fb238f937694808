//! Last-request-wins cancellation for store fetches.

use cinema_core::{ApiError, ApiResult};
use futures_util::future::{AbortHandle, Abortable};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Tracks the single in-flight request of one kind.
///
/// Starting a new request aborts the previous one; the superseded caller
/// receives `ApiError::Cancelled` and its result is never applied.
#[derive(Default)]
pub struct RequestController {
    generation: AtomicU64,
    current: Mutex<Option<AbortHandle>>,
}

impl RequestController {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn track<T, F>(&self, request: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.replace(Some(handle));

        let result = Abortable::new(request, registration)
            .await
            .map_err(|_| ApiError::Cancelled)?;

        // Completed, but a newer request started in the meantime
        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(ApiError::Cancelled);
        }
        result
    }

    /// Cancel whatever is in flight
    pub fn abort(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.replace(None);
    }

    fn replace(&self, next: Option<AbortHandle>) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = std::mem::replace(&mut *current, next) {
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let controller = Arc::new(RequestController::new());
        let (_tx, rx) = oneshot::channel::<()>();
        let (started_tx, started_rx) = oneshot::channel::<()>();

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller
                    .track(async move {
                        let _ = started_tx.send(());
                        let _ = rx.await;
                        Ok::<_, ApiError>(1)
                    })
                    .await
            })
        };
        started_rx.await.unwrap();

        let second = controller.track(async { Ok::<_, ApiError>(2) }).await;
        assert_eq!(second, Ok(2));
        assert_eq!(first.await.unwrap(), Err(ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_abort_cancels_in_flight() {
        let controller = Arc::new(RequestController::new());
        let (_tx, rx) = oneshot::channel::<()>();
        let (started_tx, started_rx) = oneshot::channel::<()>();

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller
                    .track(async move {
                        let _ = started_tx.send(());
                        let _ = rx.await;
                        Ok::<_, ApiError>(())
                    })
                    .await
            })
        };
        started_rx.await.unwrap();

        controller.abort();
        assert_eq!(pending.await.unwrap(), Err(ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let controller = RequestController::new();
        let result: ApiResult<()> = controller
            .track(async { Err(ApiError::Transport("refused".to_string())) })
            .await;
        assert_eq!(result, Err(ApiError::Transport("refused".to_string())));
    }
}
