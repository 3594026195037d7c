use std::path::PathBuf;
use std::time::Duration;

/// Upper bound on concurrent probes regardless of list size, so a huge
/// address list cannot exhaust file descriptors or raw-socket buffers.
pub const MAX_POOL_SIZE: usize = 128;

/// Settings for one sweep, built once by the caller and passed explicitly
/// to the coordinator.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How long a single echo request may wait for its reply.
    pub timeout: Duration,

    /// Echo requests sent per address before it is classified offline.
    ///
    /// Attempts run sequentially, each with the full `timeout`, so one
    /// probe blocks for at most `packet_count * timeout`.
    pub packet_count: u32,

    /// Concurrent probe limit. `None` selects one worker per address,
    /// capped at [`MAX_POOL_SIZE`].
    pub pool_size: Option<usize>,

    /// Directory the report file is written into.
    pub output_dir: PathBuf,

    /// Suppresses the progress bar.
    pub quiet: bool,
}

impl SweepConfig {
    /// Resolves the worker-pool size for a list of `address_count` entries.
    pub fn effective_pool_size(&self, address_count: usize) -> usize {
        let requested = self
            .pool_size
            .unwrap_or(address_count)
            .min(MAX_POOL_SIZE);
        requested.max(1)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1000),
            packet_count: 1,
            pool_size: None,
            output_dir: PathBuf::from("."),
            quiet: false,
        }
    }
}
