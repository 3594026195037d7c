//! # Report Serialization
//!
//! One sweep produces one [`Report`], serialized as CSV with the fixed
//! header `IP,Status` into a fresh timestamped file. The file is staged
//! as a temporary sibling and persisted with a rename, so a failed run
//! never leaves a partial report behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tempfile::NamedTempFile;

use sweepr_common::error::SweepError;

use crate::probe::ProbeResult;

/// Field names are stable across versions; parsers may rely on them.
pub const REPORT_HEADER: [&str; 2] = ["IP", "Status"];

const REPORT_PREFIX: &str = "ping-results_";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// The complete, ordered classification results of one sweep.
#[derive(Debug, Default)]
pub struct Report {
    results: Vec<ProbeResult>,
}

impl Report {
    pub fn new(results: Vec<ProbeResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Serializes the whole report to CSV text, header included, one row
    /// per result in sweep order.
    pub fn to_csv_string(&self) -> anyhow::Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(REPORT_HEADER)
            .context("writing report header")?;

        for result in &self.results {
            writer
                .write_record([result.address.as_str(), &result.status.to_string()])
                .context("writing report row")?;
        }

        let bytes = writer.into_inner().context("flushing report")?;
        String::from_utf8(bytes).context("report is not valid UTF-8")
    }
}

/// Writes `report` into `output_dir` under a fresh
/// `ping-results_<timestamp>.csv` name and returns the final path.
pub fn write_report(report: &Report, output_dir: &Path) -> Result<PathBuf, SweepError> {
    let path: PathBuf = fresh_report_path(output_dir);

    let csv_text = report
        .to_csv_string()
        .map_err(|e| report_write_error(&path, e))?;

    let mut staging = NamedTempFile::new_in(output_dir)
        .map_err(|source| SweepError::ReportWrite {
            path: path.clone(),
            source,
        })?;
    staging
        .write_all(csv_text.as_bytes())
        .map_err(|source| SweepError::ReportWrite {
            path: path.clone(),
            source,
        })?;
    staging
        .persist(&path)
        .map_err(|e| SweepError::ReportWrite {
            path: path.clone(),
            source: e.error,
        })?;

    Ok(path)
}

fn report_write_error(path: &Path, source: anyhow::Error) -> SweepError {
    SweepError::ReportWrite {
        path: path.to_path_buf(),
        source: std::io::Error::other(source),
    }
}

/// Picks a report path that does not exist yet. The timestamp has second
/// resolution, so back-to-back sweeps get a numeric suffix instead of
/// overwriting the earlier report.
fn fresh_report_path(output_dir: &Path) -> PathBuf {
    let stamp = Local::now().format(TIMESTAMP_FORMAT);
    let base: String = format!("{REPORT_PREFIX}{stamp}");

    let mut path: PathBuf = output_dir.join(format!("{base}.csv"));
    let mut attempt: u32 = 1;
    while path.exists() {
        path = output_dir.join(format!("{base}-{attempt}.csv"));
        attempt += 1;
    }
    path
}
