//! certwatch - bulk TLS certificate expiration checker
//!
//! Reads a host list (or a single host), checks every certificate concurrently
//! and reports each one as valid, warn, alert or expired.

use anyhow::{Context, Result};
use certwatch::config::{RunConfig, Settings};
use certwatch::input::load_targets;
use certwatch::output::{create_progress_bar, ConsoleSink, FileSink, ProgressSink, ResultSink};
use certwatch::{runner, Cli};
use clap::Parser;
use console::style;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load_default()?,
    };
    cli.apply(&mut settings)?;
    let config = settings.into_run_config()?;

    let targets = match &config.target {
        Some(target) => vec![target.clone()],
        None => load_targets(&config.input_file)?,
    };
    if targets.is_empty() {
        warn!(input = %config.input_file.display(), "no targets to check");
    }

    let sinks = build_sinks(&config, targets.len())?;
    let summary = runner::run(&config, targets, sinks).await?;

    if !config.is_single_host() {
        println!();
        println!("{}", style("Performance Summary").cyan().bold());
        println!("{}", summary);
    }

    Ok(())
}

/// Console always; result file and progress bar for batch runs only
fn build_sinks(config: &RunConfig, total: usize) -> Result<Vec<Box<dyn ResultSink>>> {
    let progress = (config.show_progress && !config.is_single_host())
        .then(|| create_progress_bar(total as u64));

    let mut sinks: Vec<Box<dyn ResultSink>> =
        vec![Box::new(ConsoleSink::stdout().with_progress(progress.clone()))];

    if !config.is_single_host() {
        sinks.push(Box::new(FileSink::create(&config.result_file)?));
    }
    if let Some(bar) = progress {
        sinks.push(Box::new(ProgressSink::new(bar)));
    }

    Ok(sinks)
}
