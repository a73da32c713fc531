// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use ndn_trust_model::{Certificate, Name};
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::options::{StaleReadPolicy, TtlCacheOptions};
use crate::{cache_key, CertificateCache};

/// Expiry used when a certificate's freshness does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn expiry(now: Instant, freshness: Duration) -> Instant {
    now.checked_add(freshness)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

#[derive(Debug)]
struct Entry {
    certificate: Arc<Certificate>,
    expires_at: Instant,
    tick: u64,
}

/// Entries plus their recency order. `recency` maps a monotonically
/// increasing tick to the key last touched at that tick; its first entry is
/// the least recently used.
#[derive(Debug, Default)]
struct State {
    entries: HashMap<Name, Entry>,
    recency: BTreeMap<u64, Name>,
    next_tick: u64,
}

impl State {
    fn bump(&mut self) -> u64 {
        self.next_tick += 1;
        self.next_tick
    }

    fn touch(&mut self, key: &Name) {
        let tick = self.bump();
        if let Some(entry) = self.entries.get_mut(key) {
            self.recency.remove(&entry.tick);
            entry.tick = tick;
            self.recency.insert(tick, key.clone());
        }
    }

    fn remove(&mut self, key: &Name) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.tick);
        Some(entry)
    }

    fn evict_lru(&mut self) -> Option<Name> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }

    fn upsert(&mut self, key: Name, certificate: Arc<Certificate>, expires_at: Instant, capacity: usize) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.certificate = certificate;
            entry.expires_at = expires_at;
            self.touch(&key);
            return;
        }

        while self.entries.len() >= capacity {
            match self.evict_lru() {
                Some(evicted) => debug!(certificate = %evicted, "evicted least recently used certificate"),
                None => break,
            }
        }
        let tick = self.bump();
        self.recency.insert(tick, key.clone());
        self.entries.insert(
            key,
            Entry {
                certificate,
                expires_at,
                tick,
            },
        );
    }

    fn sweep(&mut self, now: Instant) -> usize {
        let expired: Vec<Name> = self
            .entries
            .iter()
            .filter(|(_, entry)| now > entry.expires_at)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    options: TtlCacheOptions,
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl Shared {
    fn sweep(&self, now: Instant) -> usize {
        let removed = self.state.lock().sweep(now);
        if removed > 0 {
            debug!(removed, "swept expired certificates");
        }
        removed
    }
}

/// Size-bounded LRU cache whose entries expire after the certificate's
/// freshness period.
///
/// Expiry is enforced by a background sweeper that runs every
/// [`TtlCacheOptions::sweep_interval`]; the thread is stopped and joined when
/// the cache is dropped.
#[derive(Debug)]
pub struct TtlCertificateCache {
    shared: Arc<Shared>,
    sweeper: Option<JoinHandle<()>>,
}

impl TtlCertificateCache {
    /// Creates the cache and starts its sweeper. A zero sweep interval
    /// starts no sweeper.
    pub fn new(options: TtlCacheOptions) -> Self {
        let mut cache = Self::without_sweeper(options);
        if cache.shared.options.sweep_interval.is_zero() {
            return cache;
        }

        let shared = cache.shared.clone();
        match std::thread::Builder::new()
            .name("ndn-cert-cache-sweep".to_string())
            .spawn(move || run_sweeper(shared))
        {
            Ok(handle) => cache.sweeper = Some(handle),
            Err(e) => warn!(error = %e, "certificate cache sweeper failed to start"),
        }
        cache
    }

    /// Creates the cache without a sweeper; expiry only happens through
    /// [`TtlCertificateCache::sweep_expired`].
    pub fn without_sweeper(options: TtlCacheOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                options,
                stopped: Mutex::new(false),
                wake: Condvar::new(),
            }),
            sweeper: None,
        }
    }

    pub fn options(&self) -> &TtlCacheOptions {
        &self.shared.options
    }

    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }

    /// Removes every entry whose expiry lies before `now`.
    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        self.shared.sweep(now)
    }

    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    /// Cache keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<Name> {
        self.shared.state.lock().recency.values().cloned().collect()
    }
}

impl CertificateCache for TtlCertificateCache {
    fn insert_certificate(&self, certificate: Arc<Certificate>) {
        let capacity = self.shared.options.capacity;
        if capacity == 0 {
            return;
        }
        let key = cache_key(certificate.name());
        let expires_at = expiry(Instant::now(), certificate.freshness());
        trace!(certificate = %key, "caching certificate");
        self.shared
            .state
            .lock()
            .upsert(key, certificate, expires_at, capacity);
    }

    fn get_certificate(&self, name: &Name) -> Option<Arc<Certificate>> {
        let key = cache_key(name);
        let mut state = self.shared.state.lock();
        let expires_at = state.entries.get(&key)?.expires_at;

        if self.shared.options.stale_reads == StaleReadPolicy::RejectExpired
            && Instant::now() > expires_at
        {
            state.remove(&key);
            return None;
        }

        state.touch(&key);
        state.entries.get(&key).map(|entry| entry.certificate.clone())
    }

    fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }
}

impl Drop for TtlCertificateCache {
    fn drop(&mut self) {
        let Some(handle) = self.sweeper.take() else {
            return;
        };
        *self.shared.stopped.lock() = true;
        self.shared.wake.notify_all();
        if handle.join().is_err() {
            warn!("certificate cache sweeper panicked");
        }
    }
}

fn run_sweeper(shared: Arc<Shared>) {
    let interval = shared.options.sweep_interval;
    let mut stopped = shared.stopped.lock();
    while !*stopped {
        shared.wake.wait_for(&mut stopped, interval);
        if *stopped {
            break;
        }
        MutexGuard::unlocked(&mut stopped, || {
            shared.sweep(Instant::now());
        });
    }
    trace!("certificate cache sweeper stopped");
}
