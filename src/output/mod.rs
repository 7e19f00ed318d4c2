//! Result sinks and line formats
//!
//! Sinks consume the result stream produced by the pipeline. Each runs on its own
//! worker, so implementations are plain synchronous writers.

pub mod console;
pub mod file;
pub mod progress;

pub use console::ConsoleSink;
pub use file::{parse_log_line, FileSink, LogRecord};
pub use progress::{create_progress_bar, ProgressSink};

use crate::models::CheckResult;
use crate::utils::SinkError;

/// A consumer of check results
pub trait ResultSink: Send + 'static {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Handle one result
    fn write(&mut self, result: &CheckResult) -> Result<(), SinkError>;

    /// Called once after the stream closes, before the sink is considered closed
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Console form: `host:port (subject | N days | TLS x.y | notAfter)` or
/// `host:port (error)`
pub fn console_line(result: &CheckResult) -> String {
    match result.outcome() {
        Ok(cert) => format!(
            "{}:{} ({} | {} days | {} | {})",
            result.host(),
            result.port(),
            cert.subject,
            cert.days_remaining,
            cert.tls_version,
            cert.not_after_display()
        ),
        Err(e) => format!("{}:{} ({})", result.host(), result.port(), e),
    }
}

/// Result-file record: `host,port,subject,status,days,tlsVersion,notAfter` or
/// `host,port,ERROR,message`
pub fn log_fields(result: &CheckResult) -> Vec<String> {
    let mut fields = vec![result.host().to_string(), result.port().to_string()];
    match result.outcome() {
        Ok(cert) => fields.extend([
            cert.subject.clone(),
            cert.status.to_string(),
            cert.days_remaining.to_string(),
            cert.tls_version.clone(),
            cert.not_after_display(),
        ]),
        Err(e) => fields.extend(["ERROR".to_string(), e.to_string()]),
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CertificateStatus, ExpirationStatus, HostTarget};
    use crate::utils::CheckError;
    use chrono::{TimeZone, Utc};

    fn success() -> CheckResult {
        let target = HostTarget::new("Example.com", Some("443")).unwrap();
        CheckResult::new(
            &target,
            Ok(CertificateStatus {
                subject: "www.example.com".to_string(),
                is_ca: false,
                days_remaining: 15,
                not_after: Utc.with_ymd_and_hms(2030, 1, 16, 0, 0, 0).unwrap(),
                status: ExpirationStatus::Warn,
                tls_version: "TLS 1.3".to_string(),
            }),
        )
    }

    #[test]
    fn test_console_line_success() {
        assert_eq!(
            console_line(&success()),
            "example.com:443 (www.example.com | 15 days | TLS 1.3 | 2030-01-16 00:00:00 UTC)"
        );
    }

    #[test]
    fn test_log_fields_success() {
        assert_eq!(
            log_fields(&success()),
            [
                "example.com",
                "443",
                "www.example.com",
                "Warn",
                "15",
                "TLS 1.3",
                "2030-01-16 00:00:00 UTC"
            ]
        );
    }

    #[test]
    fn test_error_lines() {
        let target = HostTarget::new("down.example", Some("8443")).unwrap();
        let result = CheckResult::new(
            &target,
            Err(CheckError::dial("down.example", "8443", "connection refused")),
        );
        assert_eq!(
            console_line(&result),
            "down.example:8443 (dial down.example:8443: connection refused)"
        );
        assert_eq!(
            log_fields(&result),
            [
                "down.example",
                "8443",
                "ERROR",
                "dial down.example:8443: connection refused"
            ]
        );
    }
}
