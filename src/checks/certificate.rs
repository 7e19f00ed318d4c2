//! Certificate expiry checker
//!
//! Connects to a host, reads the leaf certificate from the handshake and
//! classifies how long it has left.

use crate::checks::dialer::DialerPool;
use crate::models::{CertificateStatus, CheckResult, ExpirationStatus, HostTarget, Thresholds};
use crate::utils::CheckError;
use chrono::{DateTime, TimeZone, Utc};
use rustls::ProtocolVersion;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing::debug;
use x509_parser::prelude::*;

/// Certificate checker
pub struct CertificateChecker {
    thresholds: Thresholds,
    timeout: Duration,
    pool: Arc<DialerPool>,
}

impl CertificateChecker {
    /// Create a checker drawing its dialers from `pool`
    pub fn new(thresholds: Thresholds, timeout: Duration, pool: Arc<DialerPool>) -> Self {
        Self {
            thresholds,
            timeout,
            pool,
        }
    }

    /// Check a single target.
    ///
    /// Never fails: dial, handshake and parse errors are carried in the result.
    pub async fn check(&self, target: &HostTarget) -> CheckResult {
        let outcome = self.probe(target).await;

        match &outcome {
            Ok(cert) => debug!(
                host = %target,
                days = cert.days_remaining,
                status = %cert.status,
                "certificate checked"
            ),
            Err(e) => debug!(host = %target, error = %e, "certificate check failed"),
        }

        CheckResult::new(target, outcome)
    }

    async fn probe(&self, target: &HostTarget) -> Result<CertificateStatus, CheckError> {
        let deadline = Instant::now() + self.timeout;
        let dialer = self.pool.acquire(self.timeout);
        let mut stream = dialer.connect(target).await?;

        let (_, connection) = stream.get_ref();
        let tls_version = tls_version_label(connection.protocol_version());
        let leaf = connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .map(|der| der.as_ref().to_vec());

        let outcome = match leaf {
            Some(der) => inspect_certificate(&der, tls_version, &self.thresholds, Utc::now())
                .map_err(|message| CheckError::Certificate {
                    host: target.host().to_string(),
                    port: target.port().to_string(),
                    message,
                }),
            None => Err(CheckError::NoCertificate {
                host: target.host().to_string(),
                port: target.port().to_string(),
            }),
        };

        // close_notify shares the check's deadline; the stream is dropped either way
        let _ = tokio::time::timeout_at(deadline, stream.shutdown()).await;

        outcome
    }
}

/// Parse a DER leaf certificate and classify it as of `now`
pub fn inspect_certificate(
    der: &[u8],
    tls_version: &str,
    thresholds: &Thresholds,
    now: DateTime<Utc>,
) -> Result<CertificateStatus, String> {
    let (_, cert) = X509Certificate::from_der(der).map_err(|e| e.to_string())?;

    let not_after = Utc
        .timestamp_opt(cert.validity().not_after.timestamp(), 0)
        .single()
        .ok_or_else(|| "invalid notAfter timestamp".to_string())?;

    let days = days_remaining(not_after, now);

    Ok(CertificateStatus {
        subject: subject_name(&cert),
        is_ca: cert.is_ca(),
        days_remaining: days,
        not_after,
        status: ExpirationStatus::classify(days, thresholds),
        tls_version: tls_version.to_string(),
    })
}

/// Days until `not_after`, rounded up so that 12 hours left counts as one day
pub fn days_remaining(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let hours = (not_after - now).num_seconds() as f64 / 3600.0;
    (hours / 24.0).ceil() as i64
}

/// First DNS subject alternative name, else the subject common name
fn subject_name(cert: &X509Certificate<'_>) -> String {
    let san = cert
        .subject_alternative_name()
        .ok()
        .flatten()
        .and_then(|ext| {
            ext.value.general_names.iter().find_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                _ => None,
            })
        });

    san.or_else(|| {
        cert.subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string)
    })
    .unwrap_or_default()
}

/// Human-readable label for the negotiated protocol version
pub fn tls_version_label(version: Option<ProtocolVersion>) -> &'static str {
    match version {
        Some(ProtocolVersion::TLSv1_3) => "TLS 1.3",
        Some(ProtocolVersion::TLSv1_2) => "TLS 1.2",
        Some(ProtocolVersion::TLSv1_1) => "TLS 1.1",
        Some(ProtocolVersion::TLSv1_0) => "TLS 1.0",
        Some(ProtocolVersion::SSLv3) => "SSL 3.0",
        _ => "Unknown",
    }
}
