// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyManagerOptions {
    /// Maximum number of certificate hops in one chain.
    pub step_limit: usize,
    /// Re-sends allowed per certificate fetch after a timeout.
    pub certificate_retries: u32,
    /// Lifetime put on certificate fetch interests.
    pub interest_lifetime: Duration,
}

impl Default for PolicyManagerOptions {
    fn default() -> Self {
        Self {
            step_limit: 10,
            certificate_retries: 3,
            interest_lifetime: Duration::from_secs(4),
        }
    }
}
