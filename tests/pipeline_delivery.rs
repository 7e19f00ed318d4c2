use certwatch::checks::{CertificateChecker, DialerPool};
use certwatch::config::RunConfig;
use certwatch::models::{CheckResult, HostTarget, Thresholds};
use certwatch::output::ResultSink;
use certwatch::pipeline::Dispatcher;
use certwatch::runner;
use certwatch::utils::SinkError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Clone, Default)]
struct Recorded {
    seen: Arc<Mutex<Vec<(String, String)>>>,
    finished: Arc<Mutex<bool>>,
}

struct RecordingSink {
    name: String,
    recorded: Recorded,
}

impl ResultSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, result: &CheckResult) -> Result<(), SinkError> {
        self.recorded
            .seen
            .lock()
            .unwrap()
            .push((result.host().to_string(), result.port().to_string()));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        *self.recorded.finished.lock().unwrap() = true;
        Ok(())
    }
}

fn closed_port() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port().to_string()
}

fn config(workers: usize, timeout: Duration) -> RunConfig {
    RunConfig {
        workers,
        timeout,
        show_progress: false,
        ..RunConfig::default()
    }
}

#[tokio::test]
async fn test_every_sink_sees_every_result_once() {
    let port = closed_port();
    let targets: Vec<HostTarget> = (0..12)
        .map(|_| HostTarget::new("127.0.0.1", Some(&port)).unwrap())
        .collect();

    for workers in [1, 3, 12] {
        let first = Recorded::default();
        let second = Recorded::default();
        let sinks: Vec<Box<dyn ResultSink>> = vec![
            Box::new(RecordingSink {
                name: "first".to_string(),
                recorded: first.clone(),
            }),
            Box::new(RecordingSink {
                name: "second".to_string(),
                recorded: second.clone(),
            }),
        ];

        let summary = runner::run(&config(workers, Duration::from_secs(2)), targets.clone(), sinks)
            .await
            .unwrap();

        assert_eq!(summary.total, 12);
        assert_eq!(summary.errors, 12);
        for recorded in [&first, &second] {
            assert_eq!(recorded.seen.lock().unwrap().len(), 12, "workers = {}", workers);
            assert!(*recorded.finished.lock().unwrap());
        }
    }
}

#[tokio::test]
async fn test_distinct_targets_delivered() {
    let ports: Vec<String> = (0..5).map(|_| closed_port()).collect();
    let targets: Vec<HostTarget> = ports
        .iter()
        .map(|p| HostTarget::new("127.0.0.1", Some(p)).unwrap())
        .collect();

    let recorded = Recorded::default();
    let sinks: Vec<Box<dyn ResultSink>> = vec![Box::new(RecordingSink {
        name: "recording".to_string(),
        recorded: recorded.clone(),
    })];

    runner::run(&config(2, Duration::from_secs(2)), targets, sinks)
        .await
        .unwrap();

    let seen: HashSet<String> = recorded
        .seen
        .lock()
        .unwrap()
        .iter()
        .map(|(_, port)| port.clone())
        .collect();
    assert_eq!(seen, ports.into_iter().collect());
}

#[tokio::test]
async fn test_workers_bound_concurrency() {
    // Accepts TCP in the backlog but never answers the handshake
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    let targets: Vec<HostTarget> = (0..4)
        .map(|_| HostTarget::new("127.0.0.1", Some(&port)).unwrap())
        .collect();

    let started = Instant::now();
    let summary = runner::run(&config(2, Duration::from_millis(400)), targets, Vec::new())
        .await
        .unwrap();

    assert_eq!(summary.errors, 4);
    assert!(started.elapsed() >= Duration::from_millis(800));
    drop(listener);
}

#[tokio::test]
async fn test_empty_batch_finishes() {
    let recorded = Recorded::default();
    let sinks: Vec<Box<dyn ResultSink>> = vec![Box::new(RecordingSink {
        name: "recording".to_string(),
        recorded: recorded.clone(),
    })];

    let summary = runner::run(&config(4, Duration::from_secs(1)), Vec::new(), sinks)
        .await
        .unwrap();

    assert_eq!(summary.total, 0);
    assert!(recorded.seen.lock().unwrap().is_empty());
    assert!(*recorded.finished.lock().unwrap());
}

#[tokio::test]
async fn test_dispatcher_rejects_after_shutdown() {
    let checker = Arc::new(CertificateChecker::new(
        Thresholds::default(),
        Duration::from_secs(1),
        DialerPool::new(1).unwrap(),
    ));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut dispatcher = Dispatcher::new(checker, 1, tx);

    let port = closed_port();
    assert!(dispatcher.submit(HostTarget::new("127.0.0.1", Some(&port)).unwrap()));
    dispatcher.wait().await;
    dispatcher.shutdown();
    dispatcher.shutdown();

    assert!(dispatcher.is_shut_down());
    assert!(!dispatcher.submit(HostTarget::new("127.0.0.1", Some(&port)).unwrap()));
    assert_eq!(dispatcher.submitted(), 1);

    assert!(rx.recv().await.is_some());
    assert!(rx.recv().await.is_none());
}
