use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of a sweep. Probe outcomes are never errors; they are
/// folded into the report by the prober. Only configuration and report
/// I/O failures reach the caller and terminate the process.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The address list could not be opened or read.
    #[error("cannot read address list '{path}': {source}")]
    AddressList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report could not be written to its destination.
    #[error("cannot write report to '{path}': {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
