//! Utility modules for certwatch

pub mod error;

pub use error::{CheckError, ConfigError, InputError, Result, SinkError, ToolkitError};
