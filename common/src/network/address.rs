//! # Address Model & Loader
//!
//! An [`Address`] is whatever one line of the input list says it is: a
//! hostname or an IP literal. Nothing is validated up front; probing an
//! address is what reveals whether it resolves or answers.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::SweepError;
use crate::warn;

/// A host to probe, kept in its original string form so the report can
/// echo the input verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Reads a newline-delimited address list. Entries are trimmed, blank
/// lines skipped, and the input order preserved. An unreadable file is
/// fatal; an empty list is valid but worth a warning since the report
/// will carry no rows.
pub fn load_addresses(path: &Path) -> Result<Vec<Address>, SweepError> {
    let contents = fs::read_to_string(path).map_err(|source| SweepError::AddressList {
        path: path.to_path_buf(),
        source,
    })?;

    let addresses: Vec<Address> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Address::new)
        .collect();

    if addresses.is_empty() {
        warn!(
            "{} contains no addresses, the report will be empty",
            path.display()
        );
    }

    Ok(addresses)
}
