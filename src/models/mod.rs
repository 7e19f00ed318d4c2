//! Data models for certwatch
//!
//! Targets going into the pipeline, results coming out, and the severity buckets
//! used to classify them.

pub mod check_result;
pub mod status;
pub mod summary;
pub mod target;

pub use check_result::{CertificateStatus, CheckResult, NOT_AFTER_FORMAT};
pub use status::{ExpirationStatus, Thresholds};
pub use summary::RunSummary;
pub use target::{HostTarget, DEFAULT_PORT};
