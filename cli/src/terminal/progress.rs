use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Progress bar for one sweep, advanced once per completed probe.
pub fn sweep_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] {bar:40.green/black} {pos}/{len} ({percent}%)",
    )
    .unwrap()
    .progress_chars("##-");

    pb.set_style(style);
    pb.enable_steady_tick(TICK_INTERVAL);
    pb
}
