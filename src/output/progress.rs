//! Progress bar driven by the result stream

use crate::models::CheckResult;
use crate::output::ResultSink;
use crate::utils::SinkError;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress bar for a batch of `len` checks
pub fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {elapsed}",
        )
        .expect("Invalid progress template")
        .progress_chars("█▓░"),
    );
    pb.set_message("Checking certificates");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Advances a progress bar once per result
pub struct ProgressSink {
    bar: ProgressBar,
    errors: u64,
}

impl ProgressSink {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar, errors: 0 }
    }
}

impl ResultSink for ProgressSink {
    fn name(&self) -> &str {
        "progress"
    }

    fn write(&mut self, result: &CheckResult) -> Result<(), SinkError> {
        if result.is_error() {
            self.errors += 1;
        }
        self.bar.inc(1);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let checked = self.bar.position();
        self.bar.finish_with_message(format!(
            "Checked {} certificates ({} errors)",
            checked, self.errors
        ));
        Ok(())
    }
}
