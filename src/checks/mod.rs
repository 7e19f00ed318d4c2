//! Check modules for certwatch
//!
//! The per-host certificate check and the TLS dialers it runs on.

pub mod certificate;
pub mod dialer;

pub use certificate::{days_remaining, inspect_certificate, tls_version_label, CertificateChecker};
pub use dialer::{Dialer, DialerPool, PooledDialer};
