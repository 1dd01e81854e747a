use crate::core::errors::{CrossingError, Result, SignalKind};
use tokio::sync::Semaphore;
use tracing::trace;

/// Counting signal used to pass turns between workers.
///
/// Starts with no permits. `release(n)` makes `n` permits available in one
/// step, so a batch of waiters is woken atomically; `wait()` consumes exactly
/// one permit. Closing the signal fails every current and future wait.
#[derive(Debug)]
pub struct Signal {
    kind: SignalKind,
    semaphore: Semaphore,
}

impl Signal {
    pub fn new(kind: SignalKind) -> Self {
        Self {
            kind,
            semaphore: Semaphore::new(0),
        }
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Release `n` waiters at once
    pub fn release(&self, n: usize) {
        trace!(signal = %self.kind, n, "release");
        self.semaphore.add_permits(n);
    }

    /// Block until a permit is available and consume it
    pub async fn wait(&self) -> Result<()> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| CrossingError::SignalClosed { signal: self.kind })?;
        permit.forget();
        Ok(())
    }

    /// Permits released but not yet consumed
    pub fn pending(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}
