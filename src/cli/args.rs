//! CLI argument definitions using clap

use crate::config::Settings;
use crate::input::parse_target;
use crate::models::DEFAULT_PORT;
use crate::utils::InputError;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "certwatch")]
#[command(version)]
#[command(about = "Check TLS certificate expiration across many hosts", long_about = None)]
#[command(after_help = "Example:\n  certwatch -w 20 -a 10 -i host.csv -o result.csv")]
pub struct Cli {
    /// Single host (with or without port) to check; the input file is ignored
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port used with --host when the host carries none
    #[arg(short, long, default_value = DEFAULT_PORT)]
    pub port: String,

    /// Warn when the certificate expires within this many days
    #[arg(short, long, value_name = "DAYS")]
    pub warn_days: Option<i64>,

    /// Alert when the certificate expires within this many days
    #[arg(short, long, value_name = "DAYS")]
    pub alert_days: Option<i64>,

    /// CSV file of `host,port` records
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Result log file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Maximum number of concurrent checks
    #[arg(long)]
    pub workers: Option<usize>,

    /// Connection timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Override file settings with whatever was given on the command line
    pub fn apply(&self, settings: &mut Settings) -> Result<(), InputError> {
        if let Some(warn) = self.warn_days {
            settings.thresholds.warn_days = warn;
        }
        if let Some(alert) = self.alert_days {
            settings.thresholds.alert_days = alert;
        }
        if let Some(input) = &self.input {
            settings.files.input = input.clone();
        }
        if let Some(output) = &self.output {
            settings.files.result = output.clone();
        }
        if let Some(workers) = self.workers {
            settings.check.workers = Some(workers);
        }
        if let Some(timeout) = self.timeout {
            settings.check.timeout_ms = timeout;
        }
        if self.no_progress {
            settings.check.show_progress = false;
        }
        if let Some(host) = &self.host {
            settings.target = Some(parse_target(host, &self.port)?);
        }
        Ok(())
    }
}
