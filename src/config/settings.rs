//! Application settings configuration
//!
//! Defines thresholds, check tuning and file locations. Settings are read from
//! TOML, overridden from the command line, then frozen into a [`RunConfig`].

use crate::models::{HostTarget, Thresholds};
use crate::utils::ConfigError;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_WORKERS: usize = 100;

/// Expiry thresholds in days
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdSettings {
    #[serde(default = "default_warn_days")]
    pub warn_days: i64,
    #[serde(default = "default_alert_days")]
    pub alert_days: i64,
}

fn default_warn_days() -> i64 {
    20
}

fn default_alert_days() -> i64 {
    10
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            warn_days: default_warn_days(),
            alert_days: default_alert_days(),
        }
    }
}

/// Connection and concurrency settings
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Concurrent checks; derived from available parallelism when unset
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_show_progress() -> bool {
    true
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            workers: None,
            show_progress: default_show_progress(),
        }
    }
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize)]
pub struct FileSettings {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_result")]
    pub result: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("host.csv")
}

fn default_result() -> PathBuf {
    PathBuf::from("result.csv")
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            input: default_input(),
            result: default_result(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub thresholds: ThresholdSettings,
    #[serde(default)]
    pub check: CheckSettings,
    #[serde(default)]
    pub files: FileSettings,
    /// Single host to check instead of reading the input file
    #[serde(skip)]
    pub target: Option<HostTarget>,
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Read {
                path: path.display().to_string(),
                source,
            },
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Validate and freeze into the configuration handed to the pipeline
    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let thresholds = Thresholds::new(self.thresholds.warn_days, self.thresholds.alert_days)?;

        let workers = self
            .check
            .workers
            .unwrap_or_else(default_workers)
            .clamp(1, MAX_WORKERS);
        let timeout = Duration::from_millis(self.check.timeout_ms.max(MIN_TIMEOUT_MS));

        Ok(RunConfig {
            thresholds,
            workers,
            timeout,
            show_progress: self.check.show_progress,
            input_file: self.files.input,
            result_file: self.files.result,
            target: self.target,
        })
    }
}

/// Twice the available parallelism, kept within 5..=50
pub fn default_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cores * 2).clamp(5, 50)
}

/// Validated, immutable configuration for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub thresholds: Thresholds,
    pub workers: usize,
    pub timeout: Duration,
    pub show_progress: bool,
    pub input_file: PathBuf,
    pub result_file: PathBuf,
    pub target: Option<HostTarget>,
}

impl RunConfig {
    /// Single-host runs skip the result file and the progress bar
    pub fn is_single_host(&self) -> bool {
        self.target.is_some()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            workers: default_workers(),
            timeout: Duration::from_millis(default_timeout_ms()),
            show_progress: default_show_progress(),
            input_file: default_input(),
            result_file: default_result(),
            target: None,
        }
    }
}
