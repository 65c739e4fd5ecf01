//! Core scheduler constants for periodic sync.

/// Default periodic sync cadence in seconds.
pub const SYNC_INTERVAL_SECS: u64 = 10;

/// Maximum jitter (milliseconds) added to periodic cycle intervals.
pub const SYNC_INTERVAL_JITTER_MS: u64 = 1_000;
