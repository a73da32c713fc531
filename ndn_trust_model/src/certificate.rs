// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::data::Data;
use crate::key::PublicKey;
use crate::name::Name;

/// A Data packet whose content binds a public key to its name for a
/// validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    data: Arc<Data>,
    public_key: PublicKey,
    not_before: SystemTime,
    not_after: SystemTime,
}

impl Certificate {
    pub fn new(
        data: impl Into<Arc<Data>>,
        public_key: PublicKey,
        not_before: SystemTime,
        not_after: SystemTime,
    ) -> Self {
        Self {
            data: data.into(),
            public_key,
            not_before,
            not_after,
        }
    }

    pub fn name(&self) -> &Name {
        self.data.name()
    }

    pub fn data(&self) -> &Arc<Data> {
        &self.data
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn not_before(&self) -> SystemTime {
        self.not_before
    }

    pub fn not_after(&self) -> SystemTime {
        self.not_after
    }

    /// Freshness period of the carrying packet; zero when absent.
    pub fn freshness(&self) -> Duration {
        self.data.freshness().unwrap_or(Duration::ZERO)
    }

    pub fn is_too_early(&self, now: SystemTime) -> bool {
        now < self.not_before
    }

    pub fn is_too_late(&self, now: SystemTime) -> bool {
        now > self.not_after
    }

    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        !self.is_too_early(now) && !self.is_too_late(now)
    }
}
