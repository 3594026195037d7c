//! # Sweep Coordinator
//!
//! Fans one probe task per address out over a bounded worker pool and
//! reassembles the results in input order. Tasks share nothing; each owns
//! its address and produces one independent result. Completion order is
//! irrelevant because results land in positionally indexed slots.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use sweepr_common::config::SweepConfig;
use sweepr_common::network::address::Address;

use crate::probe::{ProbeResult, Prober, Status};
use crate::report::Report;

/// Invoked with the running completed-probe count as probes finish.
pub type ProgressCallback = Box<dyn Fn(usize) + Send + Sync>;

pub struct Sweeper {
    prober: Arc<dyn Prober>,
}

impl Sweeper {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self { prober }
    }

    /// Probes every address concurrently, at most
    /// [`effective_pool_size`](SweepConfig::effective_pool_size) at a
    /// time, and resolves once all probes have completed. The report
    /// carries exactly one result per input address, in input order.
    ///
    /// No probe is retried; a task that dies is classified offline.
    /// Dropping the returned future aborts every in-flight probe
    /// immediately, without waiting out pending timeouts.
    pub async fn run(
        &self,
        addresses: &[Address],
        config: &SweepConfig,
        on_probe_done: Option<ProgressCallback>,
    ) -> Report {
        let pool_size: usize = config.effective_pool_size(addresses.len());
        let semaphore = Arc::new(Semaphore::new(pool_size));
        let callback: Option<Arc<dyn Fn(usize) + Send + Sync>> =
            on_probe_done.map(|cb| Arc::from(cb));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut tasks: JoinSet<(usize, Status)> = JoinSet::new();
        for (index, address) in addresses.iter().enumerate() {
            let prober = self.prober.clone();
            let address = address.clone();
            let semaphore = semaphore.clone();
            let callback = callback.clone();
            let completed = completed.clone();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore is never closed while tasks run.
                    Err(_) => return (index, Status::Offline),
                };

                let status = prober.probe(&address).await;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(cb) = &callback {
                    cb(done);
                }

                (index, status)
            });
        }

        let mut slots: Vec<Option<Status>> = vec![None; addresses.len()];
        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, status)) = joined {
                slots[index] = Some(status);
            }
        }

        let results: Vec<ProbeResult> = addresses
            .iter()
            .zip(slots)
            .map(|(address, status)| {
                ProbeResult::new(address.clone(), status.unwrap_or(Status::Offline))
            })
            .collect();

        Report::new(results)
    }
}
