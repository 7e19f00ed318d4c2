//! Check orchestration engine
//!
//! Wires a batch of targets through the dispatcher and fans every result out
//! to the registered sinks. Frontends only supply the targets and the sinks.

use crate::checks::{CertificateChecker, DialerPool};
use crate::config::RunConfig;
use crate::models::{CheckResult, HostTarget, RunSummary};
use crate::output::ResultSink;
use crate::pipeline::{Dispatcher, ResultBroadcaster};
use crate::utils::{Result, ToolkitError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Check every target and deliver each result to every sink.
///
/// Returns once all sinks have drained and closed.
pub async fn run(
    config: &RunConfig,
    targets: Vec<HostTarget>,
    sinks: Vec<Box<dyn ResultSink>>,
) -> Result<RunSummary> {
    info!(
        targets = targets.len(),
        workers = config.workers,
        timeout_ms = config.timeout.as_millis() as u64,
        "starting certificate checks"
    );

    let pool = DialerPool::new(config.workers)?;
    let checker = Arc::new(CertificateChecker::new(
        config.thresholds,
        config.timeout,
        pool,
    ));

    let mut broadcaster = ResultBroadcaster::new();
    for sink in sinks {
        broadcaster.register(sink)?;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let forwarder = tokio::spawn(forward(rx, broadcaster));

    let mut dispatcher = Dispatcher::new(checker, config.workers, tx);
    for target in targets {
        dispatcher.submit(target);
    }
    dispatcher.wait().await;
    dispatcher.shutdown();

    let (mut broadcaster, mut summary) = forwarder
        .await
        .map_err(|e| ToolkitError::Pipeline(format!("result forwarder failed: {}", e)))?;
    broadcaster.wait().await;
    summary.finish();

    info!(
        total = summary.total,
        errors = summary.errors,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "certificate checks complete"
    );
    Ok(summary)
}

/// Publish results until every sender is gone, then close the stream
async fn forward(
    mut rx: mpsc::UnboundedReceiver<CheckResult>,
    mut broadcaster: ResultBroadcaster,
) -> (ResultBroadcaster, RunSummary) {
    let mut summary = RunSummary::start();

    while let Some(result) = rx.recv().await {
        summary.record(&result);
        broadcaster.publish(result);
    }

    broadcaster.close();
    debug!(published = summary.total, "result channel drained");
    (broadcaster, summary)
}
