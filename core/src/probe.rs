//! The central **abstraction** for liveness probing.
//!
//! This module defines the classification model and the [`Prober`] trait
//! that concrete probing strategies (such as the [`icmp`] prober)
//! implement. The coordinator depends only on the trait, so the probing
//! technique can be swapped without touching the sweep logic, and tests
//! can drive the coordinator with a scripted prober.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use sweepr_common::network::address::Address;

pub mod icmp;

/// Classification of a single liveness probe.
///
/// Exactly one value per address. Resolution failure is kept distinct
/// from an unanswered probe: the former points at the DNS/config layer,
/// the latter at the network. Every other outcome folds into `Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A reply arrived within the deadline.
    Online,
    /// No reply: timeout, unreachable, or any generic failure.
    Offline,
    /// Name resolution explicitly failed for the address.
    HostNotFound,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // These strings are the report's stable field values.
        let label: &str = match self {
            Status::Online => "Online",
            Status::Offline => "Offline",
            Status::HostNotFound => "HostNotFound",
        };
        f.write_str(label)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Online" => Ok(Status::Online),
            "Offline" => Ok(Status::Offline),
            "HostNotFound" => Ok(Status::HostNotFound),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// The write-once outcome of probing one address.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub address: Address,
    pub status: Status,
    pub probed_at: DateTime<Local>,
}

impl ProbeResult {
    pub fn new(address: Address, status: Status) -> Self {
        Self {
            address,
            status,
            probed_at: Local::now(),
        }
    }
}

/// A liveness-probing capability.
///
/// Infallible by construction: every outcome, including internal send
/// failures, maps to exactly one [`Status`]. Errors never cross this
/// seam.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, address: &Address) -> Status;
}
