//! certwatch library
//!
//! Bulk TLS certificate expiration checking:
//! - Host list parsing (`host,port` records or a single `host[:port]`)
//! - Concurrent TLS handshakes on a bounded worker pool
//! - Expiration classification against warn/alert thresholds
//! - Fan-out of every result to console, result file and progress sinks
//!
//! # Usage
//!
//! ```rust,ignore
//! use certwatch::config::RunConfig;
//! use certwatch::input::load_targets;
//! use certwatch::output::ConsoleSink;
//!
//! #[tokio::main]
//! async fn main() -> certwatch::Result<()> {
//!     let config = RunConfig::default();
//!     let targets = load_targets(&config.input_file)?;
//!     let summary = certwatch::runner::run(&config, targets, vec![Box::new(ConsoleSink::stdout())]).await?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod input;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use cli::Cli;
pub use config::{RunConfig, Settings};
pub use models::{CheckResult, ExpirationStatus, HostTarget, RunSummary, Thresholds};
pub use utils::{Result, ToolkitError};
