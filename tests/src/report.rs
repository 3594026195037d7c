use std::path::PathBuf;
use std::str::FromStr;

use sweepr_common::error::SweepError;
use sweepr_common::network::address::Address;
use sweepr_core::probe::{ProbeResult, Status};
use sweepr_core::report::{self, Report};

fn sample_report() -> Report {
    Report::new(vec![
        ProbeResult::new(Address::new("127.0.0.1"), Status::Online),
        ProbeResult::new(Address::new("bad-host.example"), Status::HostNotFound),
        ProbeResult::new(Address::new("10.1.2.3"), Status::Offline),
    ])
}

/// Parses a written report back into (address, status) pairs.
fn parse_report(path: &std::path::Path) -> Vec<(String, Status)> {
    let mut reader = csv::Reader::from_path(path).expect("open report");

    let header = reader.headers().expect("report header").clone();
    assert_eq!(header, csv::StringRecord::from(vec!["IP", "Status"]));

    reader
        .records()
        .map(|record| {
            let record = record.expect("report row");
            let status = Status::from_str(&record[1]).expect("valid status");
            (record[0].to_string(), status)
        })
        .collect()
}

#[test]
fn written_report_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = report::write_report(&sample_report(), dir.path()).unwrap();

    let rows = parse_report(&path);
    assert_eq!(
        rows,
        vec![
            ("127.0.0.1".to_string(), Status::Online),
            ("bad-host.example".to_string(), Status::HostNotFound),
            ("10.1.2.3".to_string(), Status::Offline),
        ]
    );
}

#[test]
fn empty_report_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = report::write_report(&Report::default(), dir.path()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "IP,Status\n");
}

#[test]
fn repeated_sweeps_never_share_a_report_file() {
    let dir = tempfile::tempdir().unwrap();

    let first = report::write_report(&sample_report(), dir.path()).unwrap();
    let second = report::write_report(&sample_report(), dir.path()).unwrap();

    assert_ne!(first, second);
    assert!(first.exists());
    assert!(second.exists());
    assert_eq!(parse_report(&first), parse_report(&second));
}

#[test]
fn unwritable_destination_fails_without_partial_files() {
    let dir = tempfile::tempdir().unwrap();

    // Occupy the destination with a regular file so it cannot act as a
    // directory.
    let blocked: PathBuf = dir.path().join("not-a-dir");
    std::fs::write(&blocked, b"occupied").unwrap();

    let result = report::write_report(&sample_report(), &blocked);
    assert!(matches!(result, Err(SweepError::ReportWrite { .. })));

    // Nothing besides the blocking file may exist afterwards.
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("not-a-dir")]);
}
