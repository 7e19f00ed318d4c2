//! Fan-out of check results to every registered sink
//!
//! Each sink owns an unbounded channel and a blocking worker thread. Publishing
//! pushes the same `Arc<CheckResult>` into every channel; closing the broadcaster
//! drops the senders, which ends each worker's receive loop once its queue is
//! empty.

use crate::models::CheckResult;
use crate::output::ResultSink;
use crate::pipeline::counter::CompletionCounter;
use crate::utils::SinkError;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Lifecycle of a registered sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SinkState {
    /// Accepting results
    Running = 0,
    /// Stream closed, flushing buffered output
    Draining = 1,
    /// Finished; no further writes
    Closed = 2,
}

impl SinkState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SinkState::Running,
            1 => SinkState::Draining,
            _ => SinkState::Closed,
        }
    }
}

/// One-way `Running -> Draining -> Closed` state shared with the broadcaster
#[derive(Debug)]
pub struct SinkLifecycle {
    state: AtomicU8,
}

impl SinkLifecycle {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SinkState::Running as u8),
        }
    }

    pub fn state(&self) -> SinkState {
        SinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `Running -> Draining`; false if the sink already left `Running`
    fn begin_drain(&self) -> bool {
        self.state
            .compare_exchange(
                SinkState::Running as u8,
                SinkState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Move to `Closed` from either earlier state; false if already closed
    fn close(&self) -> bool {
        self.state.swap(SinkState::Closed as u8, Ordering::AcqRel) != SinkState::Closed as u8
    }
}

struct SinkWorker {
    sink: Box<dyn ResultSink>,
    lifecycle: Arc<SinkLifecycle>,
    counter: Arc<CompletionCounter>,
    rx: mpsc::UnboundedReceiver<Arc<CheckResult>>,
    in_flight: bool,
}

impl SinkWorker {
    fn run(mut self) {
        while let Some(result) = self.rx.blocking_recv() {
            self.in_flight = true;
            self.deliver(&result);
            self.in_flight = false;
            self.counter.done();
        }

        if self.lifecycle.begin_drain() {
            if let Err(e) = self.sink.finish() {
                warn!(sink = self.sink.name(), error = %e, "failed to finish sink");
            }
        }
        debug!(sink = self.sink.name(), "sink drained");
    }

    fn deliver(&mut self, result: &CheckResult) {
        if self.lifecycle.state() != SinkState::Running {
            let e = SinkError::Closed {
                name: self.sink.name().to_string(),
            };
            warn!(host = result.host(), error = %e, "dropping result");
            return;
        }

        if let Err(e) = self.sink.write(result) {
            warn!(
                sink = self.sink.name(),
                host = result.host(),
                port = result.port(),
                error = %e,
                "failed to write result"
            );
        }
    }
}

impl Drop for SinkWorker {
    fn drop(&mut self) {
        // Anything in flight or still queued here was never processed (the sink
        // panicked); account for it so the pipeline can still complete.
        if self.in_flight {
            self.counter.done();
        }
        self.rx.close();
        while self.rx.try_recv().is_ok() {
            self.counter.done();
        }
        if self.lifecycle.close() {
            self.counter.done();
        }
    }
}

struct SinkHandle {
    name: String,
    tx: Option<mpsc::UnboundedSender<Arc<CheckResult>>>,
    lifecycle: Arc<SinkLifecycle>,
    worker: Option<JoinHandle<()>>,
}

/// Delivers every published result to every registered sink exactly once
pub struct ResultBroadcaster {
    sinks: Vec<SinkHandle>,
    counter: Arc<CompletionCounter>,
    closed: bool,
}

impl Default for ResultBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultBroadcaster {
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            counter: Arc::new(CompletionCounter::new()),
            closed: false,
        }
    }

    /// Register a sink and start its worker. Must be called on a tokio runtime.
    pub fn register(&mut self, sink: Box<dyn ResultSink>) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed {
                name: sink.name().to_string(),
            });
        }

        let name = sink.name().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let lifecycle = Arc::new(SinkLifecycle::new());

        // One unit for the sink's reaction to the stream closing
        self.counter.add(1);

        let worker = SinkWorker {
            sink,
            lifecycle: Arc::clone(&lifecycle),
            counter: Arc::clone(&self.counter),
            rx,
            in_flight: false,
        };
        let handle = tokio::task::spawn_blocking(move || worker.run());

        debug!(sink = %name, "sink registered");
        self.sinks.push(SinkHandle {
            name,
            tx: Some(tx),
            lifecycle,
            worker: Some(handle),
        });
        Ok(())
    }

    /// Push one result to every sink; returns how many sinks accepted it
    pub fn publish(&self, result: CheckResult) -> usize {
        if self.closed {
            warn!(host = result.host(), "publish after close ignored");
            return 0;
        }

        let result = Arc::new(result);
        let mut delivered = 0;

        for sink in &self.sinks {
            let Some(tx) = &sink.tx else { continue };

            self.counter.add(1);
            if tx.send(Arc::clone(&result)).is_ok() {
                delivered += 1;
            } else {
                self.counter.done();
                warn!(sink = %sink.name, host = result.host(), "sink is gone, result not delivered");
            }
        }

        delivered
    }

    /// Mark the stream as ended. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for sink in &mut self.sinks {
            sink.tx.take();
        }
        debug!(sinks = self.sinks.len(), "result stream closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of units of sink-side work still outstanding
    pub fn pending(&self) -> usize {
        self.counter.pending()
    }

    /// Current lifecycle state of every registered sink, in registration order
    pub fn sink_states(&self) -> Vec<(String, SinkState)> {
        self.sinks
            .iter()
            .map(|s| (s.name.clone(), s.lifecycle.state()))
            .collect()
    }

    /// Wait until every sink has processed every delivered result and closed.
    ///
    /// Closes the stream first if the caller has not already done so.
    pub async fn wait(&mut self) {
        self.close();
        self.counter.wait().await;

        for sink in &mut self.sinks {
            if let Some(worker) = sink.worker.take() {
                if let Err(e) = worker.await {
                    warn!(sink = %sink.name, error = %e, "sink worker panicked");
                }
            }
        }
    }
}
