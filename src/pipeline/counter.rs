//! Outstanding-work counter shared between the broadcaster and its sinks

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts work that still has to finish before the pipeline may complete.
///
/// `wait` suspends on a [`Notify`] until the count drops to zero.
#[derive(Debug, Default)]
pub struct CompletionCounter {
    pending: AtomicUsize,
    zero: Notify,
}

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        self.pending.fetch_add(n, Ordering::AcqRel);
    }

    /// Mark one unit of work finished, waking waiters when none remain
    pub fn done(&self) {
        let previous = self.pending.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "completion counter underflow");
        if previous == 1 {
            self.zero.notify_waiters();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Resolve once the count is zero
    pub async fn wait(&self) {
        loop {
            // Register before checking so a concurrent `done` cannot be missed
            let notified = self.zero.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}
