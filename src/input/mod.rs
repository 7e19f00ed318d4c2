//! Host list input
//!
//! Targets come either from a single `host[:port]` string or from a
//! comma-separated host file. File records are forgiving: comments, blank lines
//! and records without a host are skipped rather than reported.

use crate::models::HostTarget;
use crate::utils::InputError;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Parse a single target string.
///
/// Accepts `host`, `host:port` and `[v6-address]:port`. `default_port` is used
/// when the string carries no port. More than one bare colon is rejected.
pub fn parse_target(target: &str, default_port: &str) -> Result<HostTarget, InputError> {
    let trimmed = target.trim();
    let invalid = || InputError::InvalidTarget {
        target: target.to_string(),
    };

    let (host, port) = if let Some(rest) = trimmed.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or_else(invalid)?;
        match after {
            "" => (host, default_port),
            _ => (host, after.strip_prefix(':').ok_or_else(invalid)?),
        }
    } else {
        match trimmed.matches(':').count() {
            0 => (trimmed, default_port),
            1 => trimmed.split_once(':').ok_or_else(invalid)?,
            _ => return Err(invalid()),
        }
    };

    HostTarget::new(host, Some(port)).ok_or_else(invalid)
}

/// Build a target from one host file record; `None` for hostless rows
pub fn parse_record(record: &StringRecord) -> Option<HostTarget> {
    let host = record.get(0)?;
    if host.starts_with('#') {
        return None;
    }
    HostTarget::new(host, record.get(1))
}

/// Read every usable record from a host list.
///
/// Records may have any number of fields; only host and port are used. Rows
/// that are not valid UTF-8 are skipped, I/O failures are returned.
pub fn read_targets<R: Read>(reader: R) -> Result<Vec<HostTarget>, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut targets = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => targets.extend(parse_record(&record)),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => debug!(error = %e, "skipping unreadable host record"),
        }
    }
    Ok(targets)
}

/// Open and read a host list file
pub fn load_targets(path: &Path) -> Result<Vec<HostTarget>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_targets(file)
}
