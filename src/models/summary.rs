//! Totals for a completed run

use crate::models::{CheckResult, ExpirationStatus};
use std::fmt;
use std::time::{Duration, Instant};

/// Counts accumulated while results stream through the pipeline
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub errors: usize,
    pub valid: usize,
    pub warn: usize,
    pub alert: usize,
    pub expired: usize,
    pub elapsed: Duration,
    started: Instant,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            total: 0,
            successful: 0,
            errors: 0,
            valid: 0,
            warn: 0,
            alert: 0,
            expired: 0,
            elapsed: Duration::ZERO,
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, result: &CheckResult) {
        self.total += 1;
        match result.status() {
            None => self.errors += 1,
            Some(status) => {
                self.successful += 1;
                match status {
                    ExpirationStatus::Valid => self.valid += 1,
                    ExpirationStatus::Warn => self.warn += 1,
                    ExpirationStatus::Alert => self.alert += 1,
                    ExpirationStatus::Expired => self.expired += 1,
                }
            }
        }
    }

    pub fn finish(&mut self) {
        self.elapsed = self.started.elapsed();
    }

    /// Most severe status seen, if any certificate was read
    pub fn worst(&self) -> Option<ExpirationStatus> {
        [
            (self.expired, ExpirationStatus::Expired),
            (self.alert, ExpirationStatus::Alert),
            (self.warn, ExpirationStatus::Warn),
            (self.valid, ExpirationStatus::Valid),
        ]
        .into_iter()
        .find(|(count, _)| *count > 0)
        .map(|(_, status)| status)
    }

    pub fn hosts_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total hosts: {}", self.total)?;
        writeln!(
            f,
            "Successful:  {} (valid {}, warn {}, alert {}, expired {})",
            self.successful, self.valid, self.warn, self.alert, self.expired
        )?;
        writeln!(f, "Errors:      {}", self.errors)?;
        writeln!(f, "Duration:    {}ms", self.elapsed.as_millis())?;
        write!(f, "Rate:        {:.1} hosts/second", self.hosts_per_second())
    }
}
