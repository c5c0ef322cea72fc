//! Outstanding-work tracking
//!
//! Every work unit carries a [`WorkGuard`]. Creating the guard increments
//! the outstanding count and dropping it decrements the count, so a unit is
//! "done" however it ends: rejected, finished, failed, panicked, or dropped
//! during shutdown. The crawl is over when the count returns to zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct TrackerInner {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Counts outstanding work units and signals when none remain
#[derive(Debug, Clone, Default)]
pub struct WorkTracker {
    inner: Arc<TrackerInner>,
}

impl WorkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of outstanding work
    ///
    /// Must be called before the unit becomes visible to a consumer, so the
    /// count can never read zero while the unit is still queued.
    pub fn register(&self) -> WorkGuard {
        self.inner.outstanding.fetch_add(1, Ordering::SeqCst);
        WorkGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Current number of outstanding units
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Resolves once the outstanding count is zero
    pub async fn wait_idle(&self) {
        loop {
            // Created before the check so a notify_waiters between the
            // check and the await is not lost
            let notified = self.inner.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Marks one unit of outstanding work; dropping it marks the unit done
#[derive(Debug)]
pub struct WorkGuard {
    inner: Arc<TrackerInner>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        let previous = self.inner.outstanding.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
