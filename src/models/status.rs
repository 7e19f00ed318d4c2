//! Expiration severity buckets and the thresholds that define them

use crate::utils::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Severity bucket for a certificate's remaining validity.
///
/// Variants are declared from least to most severe so that `Ord` follows
/// severity: `Valid < Warn < Alert < Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExpirationStatus {
    Valid,
    Warn,
    Alert,
    Expired,
}

impl ExpirationStatus {
    /// Classify days remaining against the thresholds.
    ///
    /// Boundaries fall toward the more severe bucket: `days == alert_days` is
    /// Alert and `days == warn_days` is Warn.
    pub fn classify(days_remaining: i64, thresholds: &Thresholds) -> Self {
        if days_remaining < 0 {
            ExpirationStatus::Expired
        } else if days_remaining <= thresholds.alert_days() {
            ExpirationStatus::Alert
        } else if days_remaining <= thresholds.warn_days() {
            ExpirationStatus::Warn
        } else {
            ExpirationStatus::Valid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpirationStatus::Valid => "Valid",
            ExpirationStatus::Warn => "Warn",
            ExpirationStatus::Alert => "Alert",
            ExpirationStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for ExpirationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpirationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Valid" => Ok(ExpirationStatus::Valid),
            "Warn" => Ok(ExpirationStatus::Warn),
            "Alert" => Ok(ExpirationStatus::Alert),
            "Expired" => Ok(ExpirationStatus::Expired),
            other => Err(format!("unknown expiration status: {}", other)),
        }
    }
}

/// Warn/alert thresholds in days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    warn_days: i64,
    alert_days: i64,
}

impl Thresholds {
    /// Both values must be non-negative and `alert_days <= warn_days`
    pub fn new(warn_days: i64, alert_days: i64) -> Result<Self, ConfigError> {
        if warn_days < 0 {
            return Err(ConfigError::InvalidValue {
                key: "warn_days".to_string(),
                message: format!("must be >= 0, got {}", warn_days),
            });
        }
        if alert_days < 0 {
            return Err(ConfigError::InvalidValue {
                key: "alert_days".to_string(),
                message: format!("must be >= 0, got {}", alert_days),
            });
        }
        if alert_days > warn_days {
            return Err(ConfigError::InvalidValue {
                key: "alert_days".to_string(),
                message: format!(
                    "alert_days ({}) must not exceed warn_days ({})",
                    alert_days, warn_days
                ),
            });
        }
        Ok(Self {
            warn_days,
            alert_days,
        })
    }

    pub fn warn_days(&self) -> i64 {
        self.warn_days
    }

    pub fn alert_days(&self) -> i64 {
        self.alert_days
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn_days: 20,
            alert_days: 10,
        }
    }
}
