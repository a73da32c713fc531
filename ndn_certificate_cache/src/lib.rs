// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate caches consulted by the policy manager before it asks the
//! network for a signer's certificate.
//!
//! [`TtlCertificateCache`] bounds the cache by both size (LRU eviction) and
//! time (freshness-based expiry swept on a background thread).
//! [`ValidityCertificateCache`] keeps certificates until their validity
//! window closes.

pub mod options;
pub mod ttl;
pub mod validity;

use std::sync::Arc;

use ndn_trust_model::{Certificate, Name};

pub use options::{StaleReadPolicy, TtlCacheOptions};
pub use ttl::TtlCertificateCache;
pub use validity::ValidityCertificateCache;

/// Shared certificate store. Implementations are internally synchronized.
pub trait CertificateCache: Send + Sync {
    fn insert_certificate(&self, certificate: Arc<Certificate>);

    /// Looks a certificate up by key name or by full certificate name.
    fn get_certificate(&self, name: &Name) -> Option<Arc<Certificate>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key for a certificate or key name: a trailing version component
/// is dropped, so `/a/KEY/dsk-1/%FD%01` and `/a/KEY/dsk-1` share one entry.
pub fn cache_key(name: &Name) -> Name {
    match name.last() {
        Some(last) if last.is_version() => name.get_prefix(-1),
        _ => name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_trust_model::NameComponent;

    #[test]
    fn cache_key_strips_only_version_components() {
        let key: Name = "/a/KEY/dsk-1".parse().unwrap();
        let versioned = key.clone().with(NameComponent::from_version(7));
        assert_eq!(cache_key(&versioned), key);
        assert_eq!(cache_key(&key), key);
        assert_eq!(cache_key(&Name::new()), Name::new());
    }
}
