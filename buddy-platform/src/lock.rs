//! Asynchronous mutual exclusion with a scoped release guard.
//!
//! [`AsyncMutex`] serializes access to a shared resource between async
//! callers without blocking a worker thread. Acquisition takes a fast path
//! when the lock is free and otherwise parks the caller until the current
//! holder drops its [`AsyncMutexGuard`]. Waiters are woken one at a time in
//! roughly arrival order.
//!
//! A holder that never drops its guard stalls every later [`AsyncMutex::lock`]
//! call; use [`AsyncMutex::lock_timeout`] where that must not happen.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

use crate::error::{PlatformError, PlatformResult};

/// A binary async lock guarding no data of its own.
pub struct AsyncMutex {
    inner: Arc<Mutex<()>>,
}

/// Proof of exclusive access. Dropping it releases the lock exactly once.
pub struct AsyncMutexGuard {
    _guard: OwnedMutexGuard<()>,
}

impl AsyncMutex {
    /// Creates an unlocked mutex.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(())),
        }
    }

    /// Acquires the lock if nobody holds it, without waiting.
    pub fn try_lock(&self) -> Option<AsyncMutexGuard> {
        self.inner
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| AsyncMutexGuard { _guard: guard })
    }

    /// Waits until the lock is free and acquires it. Never times out.
    pub async fn lock(&self) -> AsyncMutexGuard {
        if let Some(guard) = self.try_lock() {
            return guard;
        }
        trace!("async mutex contended, waiting");
        AsyncMutexGuard {
            _guard: self.inner.clone().lock_owned().await,
        }
    }

    /// Like [`lock`](Self::lock), but gives up after `timeout`.
    pub async fn lock_timeout(&self, timeout: Duration) -> PlatformResult<AsyncMutexGuard> {
        if let Some(guard) = self.try_lock() {
            return Ok(guard);
        }
        trace!(timeout_ms = timeout.as_millis() as u64, "async mutex contended, waiting");
        tokio::time::timeout(timeout, self.inner.clone().lock_owned())
            .await
            .map(|guard| AsyncMutexGuard { _guard: guard })
            .map_err(|_| PlatformError::LockTimeout {
                waited_ms: timeout.as_millis() as u64,
            })
    }

    /// Returns true while some guard is alive.
    pub fn is_locked(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

impl Default for AsyncMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AsyncMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

impl fmt::Debug for AsyncMutexGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncMutexGuard")
    }
}
