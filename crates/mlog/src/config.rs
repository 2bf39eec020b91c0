//! Operational configuration for the bounded fetcher.
//!
//! This is the one knob the core genuinely owns: everything else about the
//! block store (durability, networking, retries) belongs to the external
//! adapter. `FetchConfig` is threaded through `expand`, `from_entry`,
//! `from_multihash`, and the fetcher itself.

use std::time::Duration;

/// Default per-block timeout for the bounded fetcher.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a single bounded-fetch traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// How long to wait on any single `BlockStore::get` before treating the
    /// digest as unreachable and moving on.
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl FetchConfig {
    /// Build a config with a custom per-block timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}
