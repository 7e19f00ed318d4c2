//! Custom error types for certwatch
//!
//! Per-host failures (`CheckError`) travel inside check results and never abort a
//! run. Everything else surfaces through `ToolkitError` and is fatal at startup.

use thiserror::Error;

/// Top-level error type for the certwatch application
#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Sink(#[from] SinkError),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-host check failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("dial {host}:{port}: {message}")]
    Dial {
        host: String,
        port: String,
        message: String,
    },

    #[error("no peer certificates received from {host}:{port}")]
    NoCertificate { host: String, port: String },

    #[error("failed to parse certificate from {host}:{port}: {message}")]
    Certificate {
        host: String,
        port: String,
        message: String,
    },
}

impl CheckError {
    pub fn dial(host: &str, port: &str, message: impl Into<String>) -> Self {
        CheckError::Dial {
            host: host.to_string(),
            port: port.to_string(),
            message: message.into(),
        }
    }
}

/// Host list and target string errors
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to open input file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read host list: {0}")]
    Read(#[from] csv::Error),

    #[error("Invalid hostname: {target}")]
    InvalidTarget { target: String },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Result sink errors
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write result: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to encode result record: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sink {name} is closed")]
    Closed { name: String },
}

/// Result type alias using ToolkitError
pub type Result<T> = std::result::Result<T, ToolkitError>;
