// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use ndn_certificate_cache::{TtlCacheOptions, TtlCertificateCache};
use ndn_trust_model::{Certificate, Interest, Name, RingSignatureVerifier};
use ndn_trust_policy::{
    CertificateFetcher, FetchOutcome, IdentityPolicyRule, PolicyManagerOptions,
    SimplePolicyManager,
};
use ndn_trust_test_utils::{name, versioned, CertificateBuilder, TestKey};
use parking_lot::Mutex;

pub fn block_on<F: Future>(mut fut: F) -> F::Output {
    fn raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    // SAFETY: we will not move fut after pin.
    let mut fut = unsafe { Pin::new_unchecked(&mut fut) };

    loop {
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(v) => return v,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

/// Answers interests from a fixed set of certificates, with optional
/// per-name scripted outcomes consumed first.
#[derive(Default)]
pub struct ScriptedFetcher {
    certificates: Mutex<Vec<Arc<Certificate>>>,
    scripted: Mutex<HashMap<Name, VecDeque<FetchOutcome>>>,
    requested: Mutex<Vec<Interest>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serving(certificates: Vec<Arc<Certificate>>) -> Self {
        let fetcher = Self::new();
        *fetcher.certificates.lock() = certificates;
        fetcher
    }

    pub fn script(&self, name: Name, outcomes: Vec<FetchOutcome>) {
        self.scripted.lock().insert(name, outcomes.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_names(&self) -> Vec<Name> {
        self.requested
            .lock()
            .iter()
            .map(|interest| interest.name().clone())
            .collect()
    }
}

impl CertificateFetcher for ScriptedFetcher {
    fn fetch(&self, interest: &Interest) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(interest.clone());

        if let Some(outcome) = self
            .scripted
            .lock()
            .get_mut(interest.name())
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }

        self.certificates
            .lock()
            .iter()
            .find(|certificate| interest.name().is_prefix_of(certificate.name()))
            .cloned()
            .map(FetchOutcome::Certificate)
            .unwrap_or(FetchOutcome::Timeout)
    }
}

/// `/a/b` namespace: a self-signed anchor `/a/b/KEY/ksk-1` and a data
/// signing key `/a/b/KEY/dsk-1` certified by it.
pub struct Hierarchy {
    pub ksk: TestKey,
    pub dsk: TestKey,
    pub anchor: Arc<Certificate>,
    pub dsk_cert: Arc<Certificate>,
}

pub fn hierarchy() -> Hierarchy {
    let ksk = TestKey::generate();
    let dsk = TestKey::generate();
    let anchor = CertificateBuilder::new(name("/a/b/KEY/ksk-1"), &ksk)
        .issued_by("/a/b/KEY/ksk-1")
        .self_signed();
    let dsk_cert = CertificateBuilder::new(versioned("/a/b/KEY/dsk-1", 1), &dsk)
        .issued_by("/a/b/KEY/ksk-1")
        .sign(&ksk);
    Hierarchy {
        ksk,
        dsk,
        anchor,
        dsk_cert,
    }
}

/// Documents under `/a/b` are signed by a key of `/a/b`; key certificates
/// of `/a/b` are signed by another key of `/a/b`.
pub fn document_rule() -> IdentityPolicyRule {
    IdentityPolicyRule::new("^<a><b><>$", "^(<a><b>)<KEY><>$", ">", r"\0", r"\1", true).unwrap()
}

pub fn certificate_rule() -> IdentityPolicyRule {
    IdentityPolicyRule::new("^(<a><b>)<KEY><><>$", "^(<a><b>)<KEY><>$", "==", r"\1", r"\1", true)
        .unwrap()
}

pub fn manager_with(options: PolicyManagerOptions, h: &Hierarchy) -> SimplePolicyManager {
    let cache = Arc::new(TtlCertificateCache::without_sweeper(TtlCacheOptions::default()));
    let mut manager = SimplePolicyManager::with_options(options, cache, Arc::new(RingSignatureVerifier));
    manager.add_verification_policy_rule(document_rule().into_ref());
    manager.add_verification_policy_rule(certificate_rule().into_ref());
    manager.add_trust_anchor(h.anchor.clone());
    manager
}

pub fn manager(h: &Hierarchy) -> SimplePolicyManager {
    manager_with(PolicyManagerOptions::default(), h)
}
