//! Result file sink and reader
//!
//! Records are CSV, so a subject such as `Acme, Inc` is quoted on write and
//! comes back intact on read.

use crate::models::{CheckResult, ExpirationStatus, NOT_AFTER_FORMAT};
use crate::output::{log_fields, ResultSink};
use crate::utils::SinkError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes one CSV record per result
pub struct FileSink {
    name: String,
    writer: Writer<Box<dyn Write + Send>>,
}

impl FileSink {
    /// Create (truncating) the result file
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|source| SinkError::Create {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self::from_writer(
            format!("file:{}", path.display()),
            Box::new(file),
        ))
    }

    /// Write records to any byte sink
    pub fn from_writer(name: impl Into<String>, writer: Box<dyn Write + Send>) -> Self {
        // Error and certificate records differ in length
        let writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);

        Self {
            name: name.into(),
            writer,
        }
    }
}

impl ResultSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, result: &CheckResult) -> Result<(), SinkError> {
        self.writer.write_record(log_fields(result))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// A result-file record read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    Certificate {
        host: String,
        port: String,
        subject: String,
        status: ExpirationStatus,
        days: i64,
        tls_version: String,
        not_after: DateTime<Utc>,
    },
    Error {
        host: String,
        port: String,
        message: String,
    },
}

/// Parse one result-file line; `None` if it is not a record this tool writes
pub fn parse_log_line(line: &str) -> Option<LogRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let record = reader.records().next()?.ok()?;
    parse_record(&record)
}

fn parse_record(record: &StringRecord) -> Option<LogRecord> {
    match record.len() {
        4 if &record[2] == "ERROR" => Some(LogRecord::Error {
            host: record[0].to_string(),
            port: record[1].to_string(),
            message: record[3].to_string(),
        }),
        7 => {
            let not_after = NaiveDateTime::parse_from_str(&record[6], NOT_AFTER_FORMAT).ok()?;

            Some(LogRecord::Certificate {
                host: record[0].to_string(),
                port: record[1].to_string(),
                subject: record[2].to_string(),
                status: record[3].parse().ok()?,
                days: record[4].parse().ok()?,
                tls_version: record[5].to_string(),
                not_after: Utc.from_utc_datetime(&not_after),
            })
        }
        _ => None,
    }
}
