//! Bounded worker pool for certificate checks

use crate::checks::CertificateChecker;
use crate::models::{CheckResult, HostTarget};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Runs checks with at most `workers` in flight at once.
///
/// Every completed check is sent on the results channel. Excess submissions wait
/// for a permit; order of completion is unspecified.
pub struct Dispatcher {
    checker: Arc<CertificateChecker>,
    permits: Arc<Semaphore>,
    workers: usize,
    tasks: JoinSet<()>,
    results: Option<mpsc::UnboundedSender<CheckResult>>,
    submitted: usize,
}

impl Dispatcher {
    pub fn new(
        checker: Arc<CertificateChecker>,
        workers: usize,
        results: mpsc::UnboundedSender<CheckResult>,
    ) -> Self {
        let workers = workers.max(1);
        Self {
            checker,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
            tasks: JoinSet::new(),
            results: Some(results),
            submitted: 0,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of targets accepted so far
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Queue a check for `target`. Returns false once the dispatcher is shut down.
    pub fn submit(&mut self, target: HostTarget) -> bool {
        let Some(results) = self.results.clone() else {
            warn!(host = %target, "submit after shutdown ignored");
            return false;
        };

        let checker = Arc::clone(&self.checker);
        let permits = Arc::clone(&self.permits);

        self.tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                warn!(host = %target, "dispatcher closed before check started");
                return;
            };

            let result = checker.check(&target).await;
            if results.send(result).is_err() {
                warn!(host = %target, "result receiver dropped");
            }
        });

        self.submitted += 1;
        true
    }

    /// Wait for every submitted check to complete
    pub async fn wait(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "check task failed");
            }
        }
        debug!(submitted = self.submitted, "all checks complete");
    }

    /// Release pool resources and the result sender. Idempotent.
    pub fn shutdown(&mut self) {
        if self.results.take().is_some() {
            self.permits.close();
            self.tasks.abort_all();
            debug!("dispatcher shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.results.is_none()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
