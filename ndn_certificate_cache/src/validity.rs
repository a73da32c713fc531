// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use ndn_trust_model::{Certificate, Name};
use parking_lot::Mutex;
use tracing::debug;

use crate::{cache_key, CertificateCache};

/// Unbounded cache that serves a certificate only inside its validity
/// window. Entries past `not_after` are dropped when read.
#[derive(Debug, Default)]
pub struct ValidityCertificateCache {
    entries: Mutex<HashMap<Name, Arc<Certificate>>>,
}

impl ValidityCertificateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_certificate_at(&self, name: &Name, now: SystemTime) -> Option<Arc<Certificate>> {
        let key = cache_key(name);
        let mut entries = self.entries.lock();
        let certificate = entries.get(&key)?.clone();

        if certificate.is_too_early(now) {
            return None;
        }
        if certificate.is_too_late(now) {
            debug!(certificate = %key, "dropping certificate past its validity window");
            entries.remove(&key);
            return None;
        }
        Some(certificate)
    }
}

impl CertificateCache for ValidityCertificateCache {
    fn insert_certificate(&self, certificate: Arc<Certificate>) {
        let key = cache_key(certificate.name());
        self.entries.lock().insert(key, certificate);
    }

    fn get_certificate(&self, name: &Name) -> Option<Arc<Certificate>> {
        self.get_certificate_at(name, SystemTime::now())
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
