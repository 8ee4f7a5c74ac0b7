//! Pacing between page requests
//!
//! The crawl loop waits between pages through a [`Delay`] rather than
//! sleeping directly, so the wait can be swapped out where wall-clock time
//! is unwanted.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A suspension point between two page fetches
#[async_trait]
pub trait Delay: Send + Sync {
    async fn pause(&self, duration: Duration);
}

#[async_trait]
impl<T: Delay + ?Sized> Delay for Arc<T> {
    async fn pause(&self, duration: Duration) {
        (**self).pause(duration).await
    }
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn pause(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tracing::debug!("Pausing {:?} before next page", duration);
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn pause(&self, _duration: Duration) {}
}
