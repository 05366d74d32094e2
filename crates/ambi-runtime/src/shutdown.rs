#![forbid(unsafe_code)]

//! Cooperative shutdown signal.
//!
//! A [`ShutdownSignal`] is a one-shot latch shared between the input thread
//! and whoever supervises the session. Triggering wakes every waiter; once
//! triggered it stays triggered.
//!
//! Checking is a lock-free atomic load, so the read loop can poll it on every
//! iteration. Waiting blocks on a condition variable until triggered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    triggered: AtomicBool,
    lock: Mutex<()>,
    cvar: Condvar,
}

/// Clonable handle to a shared shutdown latch.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    /// Create an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Request shutdown and wake all waiters. Idempotent.
    pub fn trigger(&self) {
        // Set under the lock so a waiter cannot miss the wakeup between its
        // check and its wait.
        let _guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.inner.triggered.swap(true, Ordering::AcqRel) {
            tracing::debug!("shutdown triggered");
        }
        self.inner.cvar.notify_all();
    }

    /// Block until triggered.
    pub fn wait(&self) {
        let mut guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !self.is_triggered() {
            guard = self
                .inner
                .cvar
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
