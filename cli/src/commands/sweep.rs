use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;

use sweepr_common::network::address::{self, Address};
use sweepr_common::{error, info, success, warn};
use sweepr_core::probe::icmp::IcmpProber;
use sweepr_core::probe::Status;
use sweepr_core::report::{self, Report};
use sweepr_core::sweep::{ProgressCallback, Sweeper};

use crate::commands::CommandLine;
use crate::terminal::progress;

pub async fn sweep(commands: CommandLine) -> anyhow::Result<()> {
    let cfg = commands.to_config();

    let addresses: Vec<Address> = address::load_addresses(&commands.input)?;
    info!(
        "Probing {} addresses from {}",
        addresses.len(),
        commands.input.display()
    );

    let prober = IcmpProber::new(cfg.timeout, cfg.packet_count)
        .context("opening raw ICMP channels (this usually requires root or CAP_NET_RAW)")?;
    let sweeper = Sweeper::new(Arc::new(prober));

    let bar = progress::sweep_bar(addresses.len() as u64, cfg.quiet);
    let bar_ref = bar.clone();
    let on_probe_done: Option<ProgressCallback> = Some(Box::new(move |_done| {
        bar_ref.inc(1);
    }));

    let start_time: Instant = Instant::now();
    let report: Report = tokio::select! {
        report = sweeper.run(&addresses, &cfg, on_probe_done) => report,
        _ = tokio::signal::ctrl_c() => {
            bar.abandon();
            warn!("Sweep aborted, abandoning in-flight probes");
            anyhow::bail!("aborted by user");
        }
    };
    bar.finish_and_clear();

    sweep_ends(&report, start_time.elapsed());

    match report::write_report(&report, &cfg.output_dir) {
        Ok(path) => {
            success!("Report written to {}", path.display().to_string().bold());
            Ok(())
        }
        Err(e) => {
            error!("Could not persist the report, dumping it to stdout instead");
            if let Ok(csv_text) = report.to_csv_string() {
                print!("{csv_text}");
            }
            Err(e.into())
        }
    }
}

fn sweep_ends(report: &Report, total_time: Duration) {
    let mut online: usize = 0;
    let mut offline: usize = 0;
    let mut not_found: usize = 0;

    for result in report.results() {
        match result.status {
            Status::Online => online += 1,
            Status::Offline => offline += 1,
            Status::HostNotFound => not_found += 1,
        }
    }

    let probed: ColoredString = format!("{} addresses", report.len()).bold().green();
    let elapsed: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    success!("Sweep complete: {probed} probed in {elapsed}");
    info!(
        "{} online, {} offline, {} not found",
        online.to_string().green(),
        offline.to_string().red(),
        not_found.to_string().yellow()
    );
}
