// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// What a read does with an entry whose freshness has lapsed but which the
/// sweeper has not removed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleReadPolicy {
    /// Return it; expiry is enforced only by the periodic sweep.
    #[default]
    ServeUntilSwept,
    /// Drop it on read and report a miss.
    RejectExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlCacheOptions {
    /// Maximum number of entries; `0` disables caching.
    pub capacity: usize,
    /// Delay between expiry sweeps.
    pub sweep_interval: Duration,
    pub stale_reads: StaleReadPolicy,
}

impl Default for TtlCacheOptions {
    fn default() -> Self {
        Self {
            capacity: 1000,
            sweep_interval: Duration::from_secs(60),
            stale_reads: StaleReadPolicy::default(),
        }
    }
}
