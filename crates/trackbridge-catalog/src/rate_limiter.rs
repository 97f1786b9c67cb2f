// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, Duration};

/// Rate limiter for destination search calls.
///
/// Caps the number of simultaneous in-flight requests with a semaphore and
/// applies a fixed pacing delay before every call to smooth burst traffic.
/// Constructed by the client builder so tests can substitute their own
/// instance instead of touching shared state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    pacing: Duration,
}

/// Held for the duration of one remote call; dropping it releases the slot.
#[derive(Debug)]
pub struct RateLimitPermit {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiter {
    /// Create a rate limiter allowing `max_concurrent` in-flight requests
    /// with `pacing` applied before each one.
    pub fn new(max_concurrent: usize, pacing: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            pacing,
        }
    }

    /// Defaults sized for the destination catalog's observed tolerance.
    pub fn destination_default() -> Self {
        Self::new(5, Duration::from_millis(100))
    }

    /// Wait for a request slot, then apply the pacing delay.
    pub async fn acquire(&self) -> RateLimitPermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore closed");

        if !self.pacing.is_zero() {
            tracing::trace!(target: "catalog", "pacing: waiting {:?}", self.pacing);
            sleep(self.pacing).await;
        }

        RateLimitPermit { _permit: permit }
    }
}
