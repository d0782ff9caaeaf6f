//! Per-request cancellation context

use crate::error::{StoreError, StoreResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline handed to every storage call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(token: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            token,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// A context that never expires
    pub fn background() -> Self {
        Self::new(CancellationToken::new(), None)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail fast if the context is already done
    pub fn ensure_active(&self) -> StoreResult<()> {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(())
    }

    /// Drive `fut` until it completes or the context is cancelled or expires.
    pub async fn run<F>(&self, fut: F) -> StoreResult<F::Output>
    where
        F: Future,
    {
        self.ensure_active()?;

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(StoreError::Cancelled),
            _ = wait_until(self.deadline) => Err(StoreError::Cancelled),
            out = fut => Ok(out),
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
