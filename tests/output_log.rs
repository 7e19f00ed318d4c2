use certwatch::checks::inspect_certificate;
use certwatch::models::{CertificateStatus, CheckResult, ExpirationStatus, HostTarget, Thresholds};
use certwatch::output::{parse_log_line, FileSink, LogRecord, ResultSink};
use certwatch::utils::CheckError;
use chrono::{TimeZone, Utc};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

fn expiring(host: &str) -> CheckResult {
    let target = HostTarget::new(host, Some("443")).unwrap();
    CheckResult::new(
        &target,
        Ok(CertificateStatus {
            subject: format!("www.{}", host),
            is_ca: false,
            days_remaining: 8,
            not_after: Utc.with_ymd_and_hms(2030, 3, 9, 12, 30, 0).unwrap(),
            status: ExpirationStatus::Alert,
            tls_version: "TLS 1.2".to_string(),
        }),
    )
}

#[test]
fn test_file_sink_writes_readable_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.csv");

    let mut sink = FileSink::create(&path).unwrap();
    sink.write(&expiring("example.com")).unwrap();
    let down = HostTarget::new("down.example", Some("8443")).unwrap();
    sink.write(&CheckResult::new(
        &down,
        Err(CheckError::dial("down.example", "8443", "connection refused")),
    ))
    .unwrap();
    sink.finish().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let records: Vec<LogRecord> = content.lines().filter_map(parse_log_line).collect();

    assert_eq!(
        records,
        vec![
            LogRecord::Certificate {
                host: "example.com".to_string(),
                port: "443".to_string(),
                subject: "www.example.com".to_string(),
                status: ExpirationStatus::Alert,
                days: 8,
                tls_version: "TLS 1.2".to_string(),
                not_after: Utc.with_ymd_and_hms(2030, 3, 9, 12, 30, 0).unwrap(),
            },
            LogRecord::Error {
                host: "down.example".to_string(),
                port: "8443".to_string(),
                message: "dial down.example:8443: connection refused".to_string(),
            },
        ]
    );
}

#[test]
fn test_file_sink_truncates_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.csv");
    std::fs::write(&path, "stale,443,ERROR,old\n").unwrap();

    let mut sink = FileSink::create(&path).unwrap();
    sink.finish().unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn test_file_sink_bad_path_is_create_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileSink::create(&dir.path().join("missing").join("result.csv"))
        .err()
        .unwrap();
    assert!(err.to_string().contains("result.csv"));
}

#[test]
fn test_common_name_with_comma_survives_result_file() {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = DistinguishedName::new();
    params.distinguished_name.push(DnType::CommonName, "Acme, Inc");
    params.not_before = rcgen::date_time_ymd(2020, 1, 1);
    params.not_after = rcgen::date_time_ymd(2031, 1, 1);
    let key = KeyPair::generate().unwrap();
    let der = params.self_signed(&key).unwrap().der().to_vec();

    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let cert = inspect_certificate(&der, "TLS 1.3", &Thresholds::default(), now).unwrap();
    assert_eq!(cert.subject, "Acme, Inc");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.csv");
    let target = HostTarget::new("corp.example", None).unwrap();
    let mut sink = FileSink::create(&path).unwrap();
    sink.write(&CheckResult::new(&target, Ok(cert))).unwrap();
    sink.finish().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        parse_log_line(content.trim_end()),
        Some(LogRecord::Certificate {
            host: "corp.example".to_string(),
            port: "443".to_string(),
            subject: "Acme, Inc".to_string(),
            status: ExpirationStatus::Valid,
            days: 365,
            tls_version: "TLS 1.3".to_string(),
            not_after: Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap(),
        })
    );
}
