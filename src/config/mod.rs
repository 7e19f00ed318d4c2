//! Configuration module for certwatch
//!
//! Handles loading settings from TOML files and validating them into a
//! [`RunConfig`].

pub mod settings;

pub use settings::{default_workers, RunConfig, Settings};
