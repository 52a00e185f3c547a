//! Deadlines and cancellation for a single operation.
//!
//! A [`Context`] is handed from the handler through the service to the
//! repository, where the store call is run with [`Context::run`].
//!
//! ```rust
//! # use std::time::Duration;
//! # use todo_backend::infra::{context::Context, error::ApiError};
//! # tokio_test::block_on(async {
//! let (ctx, cancel) = Context::new(None);
//! cancel.cancel();
//! let result = ctx.run(async { Ok(1) }).await;
//! assert!(matches!(result, Err(ApiError::Cancelled)));
//! # });
//! ```

use super::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{async_trait, extract::FromRequestParts};
use http::request::Parts;
use std::{convert::Infallible, future::Future, time::Duration};
use tokio::{sync::watch, time::Instant};

/// The deadline and cancellation signal of an operation.
#[derive(Clone, Debug)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: watch::Receiver<bool>,
}

/// Cancels the [`Context`] it was created with.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Signals every clone of the context to stop.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl Context {
    /// A context with an optional deadline, and a handle for cancelling it.
    pub fn new(deadline: Option<Instant>) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline,
            cancelled: rx,
        };
        (ctx, CancelHandle(tx))
    }

    /// A context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        Self::new(None).0
    }

    /// A context that expires after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Some(Instant::now() + timeout)).0
    }

    /// Whether the operation should stop.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fails with [`ApiError::Cancelled`] if the operation should stop.
    pub fn check(&self) -> ApiResult<()> {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        Ok(())
    }

    /// Runs `fut` until it completes, or until the context is cancelled.
    ///
    /// On cancellation `fut` is dropped, so any uncommitted work is discarded.
    pub async fn run<F, T>(&self, fut: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        self.check()?;
        let mut cancelled = self.cancelled.clone();
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        let cancelled = async {
            // The handle was dropped without cancelling.
            let abandoned = cancelled.wait_for(|c| *c).await.is_err();
            if abandoned {
                std::future::pending::<()>().await;
            }
        };
        tokio::select! {
            res = fut => res,
            _ = deadline => {
                tracing::warn!("deadline exceeded");
                Err(ApiError::Cancelled)
            }
            _ = cancelled => {
                tracing::info!("cancelled by caller");
                Err(ApiError::Cancelled)
            }
        }
    }
}

/// Every request gets a context that expires with the request timeout.
#[async_trait]
impl FromRequestParts<AppState> for Context {
    type Rejection = Infallible;

    async fn from_request_parts(_: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Context::with_timeout(state.config().server.request_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let ctx = Context::background();
        let result = ctx.run(async { Ok(42) }).await.unwrap();
        assert_eq!(42, result);
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn errors_pass_through() {
        let ctx = Context::background();
        let result: ApiResult<()> = ctx
            .run(async { Err(crate::infra::error::ClientError::NotFound.into()) })
            .await;
        assert!(matches!(
            result,
            Err(ApiError::ClientError(
                crate::infra::error::ClientError::NotFound
            ))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_deadline() {
        let ctx = Context::with_timeout(Duration::from_millis(100));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn stops_when_cancelled() {
        let (ctx, cancel) = Context::new(None);
        let waiting = ctx.clone();
        let task =
            tokio::spawn(async move { waiting.run(std::future::pending::<ApiResult<()>>()).await });
        cancel.cancel();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn does_not_start_when_already_cancelled() {
        let (ctx, cancel) = Context::new(None);
        cancel.cancel();
        let mut started = false;
        let result = ctx
            .run(async {
                started = true;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(!started);
    }
}
