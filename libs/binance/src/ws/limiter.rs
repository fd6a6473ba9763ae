//! Outbound command rate limiting.
//!
//! Token bucket over a fixed window: every acquired permit is handed back
//! one full window after acquisition, so at most `burst` command sends can
//! begin within any rolling window. Scoped strictly to command sends;
//! inbound event delivery is unbounded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

pub(crate) struct CommandLimiter {
    permits: Arc<Semaphore>,
    window: Duration,
}

impl CommandLimiter {
    pub fn new(burst: usize, window: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(burst.max(1))),
            window,
        }
    }

    /// Take one send slot, suspending while the current window is full.
    ///
    /// The slot is returned to the bucket `window` after this call returns,
    /// from a detached timer task.
    pub async fn acquire(&self) {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .expect("limiter semaphore is never closed");
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            drop(permit);
        });
    }
}
