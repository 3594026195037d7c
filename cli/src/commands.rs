pub mod sweep;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sweepr_common::config::SweepConfig;

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(about = "A concurrent network reachability sweeper.")]
pub struct CommandLine {
    /// Newline-delimited file of hostnames or IP addresses to probe
    pub input: PathBuf,

    /// Per-probe reply deadline in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Echo requests sent per address before it is classified offline
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Maximum number of concurrent probes [default: one per address, capped at 128]
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Directory the report is written into
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Append sweep log lines to this file; entries older than 7 days are pruned
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> SweepConfig {
        SweepConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            packet_count: self.count,
            pool_size: self.pool_size,
            output_dir: self.output_dir.clone(),
            quiet: self.quiet,
        }
    }
}
