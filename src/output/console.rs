//! Colored console sink

use crate::models::{CheckResult, ExpirationStatus};
use crate::output::{console_line, ResultSink};
use crate::utils::SinkError;
use console::{style, StyledObject};
use indicatif::ProgressBar;
use std::io::{self, Write};

/// Prints one tagged line per result
pub struct ConsoleSink {
    writer: Box<dyn Write + Send>,
    progress: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            progress: None,
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Print around `bar` so result lines do not tear it
    pub fn with_progress(mut self, bar: Option<ProgressBar>) -> Self {
        self.progress = bar;
        self
    }
}

/// Severity tag shown before each line
fn tag(result: &CheckResult) -> StyledObject<&'static str> {
    match result.status() {
        None => style("  ERROR  ").white().on_red().bold(),
        Some(ExpirationStatus::Valid) => style("  VALID  ").black().on_green(),
        Some(ExpirationStatus::Warn) => style("  WARN   ").black().on_yellow(),
        Some(ExpirationStatus::Alert) => style("  ALERT  ").red().on_black().bold().blink(),
        Some(ExpirationStatus::Expired) => style(" EXPIRED ").white().on_red().bold(),
    }
}

impl ResultSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn write(&mut self, result: &CheckResult) -> Result<(), SinkError> {
        let line = format!("{} {}", tag(result), console_line(result));

        let writer = &mut self.writer;
        match &self.progress {
            Some(bar) => bar.suspend(|| writeln!(writer, "{}", line))?,
            None => writeln!(writer, "{}", line)?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
