//! Result of a single certificate check

use crate::models::{ExpirationStatus, HostTarget};
use crate::utils::CheckError;
use chrono::{DateTime, Utc};

/// Format used for `not_after` in console and log output
pub const NOT_AFTER_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Certificate details extracted from a successful handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateStatus {
    /// First DNS SAN, falling back to the subject CN
    pub subject: String,
    pub is_ca: bool,
    /// Whole days until expiry, rounded up; negative once expired
    pub days_remaining: i64,
    pub not_after: DateTime<Utc>,
    pub status: ExpirationStatus,
    /// Negotiated protocol, e.g. "TLS 1.3"
    pub tls_version: String,
}

impl CertificateStatus {
    pub fn not_after_display(&self) -> String {
        self.not_after.format(NOT_AFTER_FORMAT).to_string()
    }
}

/// Outcome of probing one host.
///
/// Either the certificate details or the per-host error, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    host: String,
    port: String,
    outcome: Result<CertificateStatus, CheckError>,
}

impl CheckResult {
    /// Host is lower-cased so results key consistently regardless of input casing
    pub fn new(target: &HostTarget, outcome: Result<CertificateStatus, CheckError>) -> Self {
        Self {
            host: target.host().to_string(),
            port: target.port().to_string(),
            outcome,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn outcome(&self) -> Result<&CertificateStatus, &CheckError> {
        self.outcome.as_ref()
    }

    pub fn certificate(&self) -> Option<&CertificateStatus> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&CheckError> {
        self.outcome.as_ref().err()
    }

    pub fn status(&self) -> Option<ExpirationStatus> {
        self.certificate().map(|c| c.status)
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }
}
