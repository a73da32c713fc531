// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{
    block_on, certificate_rule, document_rule, hierarchy, manager, manager_with, ScriptedFetcher,
};
use ndn_certificate_cache::{CertificateCache, TtlCacheOptions, TtlCertificateCache};
use ndn_name_regex::NamePattern;
use ndn_trust_model::{PublicKey, RingSignatureVerifier, SignatureVerifier};
use ndn_trust_policy::{
    AuditEvent, ChainValidator, Evaluation, FetchOutcome, PolicyManager, PolicyManagerOptions,
    SimplePolicyManager,
};
use ndn_trust_test_utils::{name, versioned, CertificateBuilder, DataBuilder, TestKey};

#[test]
fn caller_driven_two_hop_chain() {
    let h = hierarchy();
    let m = manager(&h);
    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);

    let request = match m.evaluate(doc, 0) {
        Evaluation::NeedsFetch(request) => request,
        Evaluation::Resolved(decision) => panic!("resolved early: {decision:?}"),
    };
    assert_eq!(request.interest().name(), &name("/a/b/KEY/dsk-1"));

    // Second hop: the fetched certificate is signed by the anchor.
    let hop = match m.evaluate(h.dsk_cert.data().clone(), request.step_count()) {
        Evaluation::Resolved(decision) => decision,
        Evaluation::NeedsFetch(request) => panic!("anchor not used: {request:?}"),
    };
    assert!(hop.is_trusted);

    assert!(request.certificate_verified(h.dsk_cert.clone()).is_trusted);
}

#[test]
fn validator_walks_the_chain_and_caches_the_certificate() {
    let h = hierarchy();
    let m = Arc::new(manager(&h));
    let fetcher = Arc::new(ScriptedFetcher::serving(vec![h.dsk_cert.clone()]));
    let validator = ChainValidator::new(m.clone(), fetcher.clone());

    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);
    let decision = validator.validate(doc);
    assert!(decision.is_trusted, "{:?}", decision.reasons);
    assert_eq!(fetcher.requested_names(), vec![name("/a/b/KEY/dsk-1")]);
    assert_eq!(m.cache().len(), 1);

    let doc2 = DataBuilder::new("/a/b/doc2")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);
    assert!(validator.validate(doc2).is_trusted);
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn async_validation_matches_sync() {
    let h = hierarchy();
    let fetcher = Arc::new(ScriptedFetcher::serving(vec![h.dsk_cert.clone()]));
    let validator = ChainValidator::new(Arc::new(manager(&h)), fetcher);

    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);
    assert!(block_on(validator.validate_async(doc)).is_trusted);

    let forged = DataBuilder::new("/a/b/forged")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.ksk);
    assert!(!block_on(validator.validate_async(forged)).is_trusted);
}

#[test]
fn timeouts_are_retried_within_budget() {
    let h = hierarchy();
    let fetcher = Arc::new(ScriptedFetcher::serving(vec![h.dsk_cert.clone()]));
    fetcher.script(
        name("/a/b/KEY/dsk-1"),
        vec![FetchOutcome::Timeout, FetchOutcome::Timeout],
    );
    let validator = ChainValidator::new(Arc::new(manager(&h)), fetcher.clone());

    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);
    assert!(validator.validate(doc).is_trusted);
    assert_eq!(fetcher.calls(), 3);
}

#[test]
fn exhausted_retries_deny() {
    let h = hierarchy();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let validator = ChainValidator::new(Arc::new(manager(&h)), fetcher.clone());

    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);
    assert!(!validator.validate(doc).is_trusted);
    assert_eq!(fetcher.calls(), 4);
}

#[test]
fn cyclic_chain_stops_at_step_limit() {
    let k1 = TestKey::generate();
    let k2 = TestKey::generate();
    let c1 = CertificateBuilder::new(versioned("/a/b/KEY/k1", 1), &k1)
        .issued_by("/a/b/KEY/k2")
        .sign(&k2);
    let c2 = CertificateBuilder::new(versioned("/a/b/KEY/k2", 1), &k2)
        .issued_by("/a/b/KEY/k1")
        .sign(&k1);

    let cache = Arc::new(TtlCertificateCache::without_sweeper(TtlCacheOptions::default()));
    let mut m = SimplePolicyManager::with_options(
        PolicyManagerOptions {
            step_limit: 4,
            ..PolicyManagerOptions::default()
        },
        cache,
        Arc::new(RingSignatureVerifier),
    );
    m.add_verification_policy_rule(common::document_rule().into_ref());
    m.add_verification_policy_rule(common::certificate_rule().into_ref());

    let fetcher = Arc::new(ScriptedFetcher::serving(vec![c1, c2]));
    let validator = ChainValidator::new(Arc::new(m), fetcher.clone());

    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/k1")
        .sign(&k1);
    let decision = validator.validate(doc);
    assert!(!decision.is_trusted);
    assert_eq!(fetcher.calls(), 4);
    assert!(decision.reasons.iter().any(|r| r.contains("step limit")));
}

#[test]
fn untrusted_intermediate_certificate_denies_data() {
    let h = hierarchy();
    let rogue = TestKey::generate();
    let rogue_dsk = CertificateBuilder::new(versioned("/a/b/KEY/dsk-1", 1), &h.dsk)
        .issued_by("/a/b/KEY/ksk-1")
        .sign(&rogue);
    let fetcher = Arc::new(ScriptedFetcher::serving(vec![rogue_dsk]));
    let m = Arc::new(manager(&h));
    let validator = ChainValidator::new(m.clone(), fetcher);

    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);
    assert!(!validator.validate(doc).is_trusted);
    assert!(m.cache().is_empty());
}

#[test]
fn exempt_data_skips_verification_and_uncovered_data_is_denied() {
    let h = hierarchy();
    let mut m = manager(&h);
    m.add_verification_exemption(NamePattern::compile("^<public>").unwrap());
    let fetcher = Arc::new(ScriptedFetcher::new());
    let validator = ChainValidator::new(Arc::new(m), fetcher.clone());
    let key = TestKey::generate();

    assert!(validator
        .validate(DataBuilder::new("/public/readme").sign(&key))
        .is_trusted);
    assert!(!validator
        .validate(DataBuilder::new("/private/readme").sign(&key))
        .is_trusted);
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn audit_collects_events_across_hops() {
    let h = hierarchy();
    let fetcher = Arc::new(ScriptedFetcher::serving(vec![h.dsk_cert.clone()]));
    fetcher.script(name("/a/b/KEY/dsk-1"), vec![FetchOutcome::Timeout]);
    let validator = ChainValidator::new(
        Arc::new(manager_with(PolicyManagerOptions::default(), &h)),
        fetcher,
    );
    validator.enable_audit();

    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);
    assert!(validator.validate(doc).is_trusted);

    let audit = validator.take_audit().unwrap();
    let events = audit.events();
    assert!(events.iter().any(|e| matches!(
        e,
        AuditEvent::FetchRequested { step_count: 1, .. }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        AuditEvent::FetchTimedOut { retries_remaining: 2, .. }
    )));
    assert!(events.iter().any(|e| matches!(e, AuditEvent::AnchorHit { .. })));
    assert!(matches!(
        events.last(),
        Some(AuditEvent::SignatureChecked { valid: true, .. })
    ));
    assert!(validator.take_audit().is_none());
}

/// Verifies with ring after a fixed delay.
struct SlowVerifier(Duration);

impl SignatureVerifier for SlowVerifier {
    fn verify(&self, signed_portion: &[u8], signature: &[u8], key: &PublicKey) -> bool {
        std::thread::sleep(self.0);
        RingSignatureVerifier.verify(signed_portion, signature, key)
    }
}

#[test]
fn concurrent_validations_do_not_serialize_on_audit() {
    let h = hierarchy();
    let cache = Arc::new(TtlCertificateCache::without_sweeper(TtlCacheOptions::default()));
    let mut m = SimplePolicyManager::new(cache, Arc::new(SlowVerifier(Duration::from_millis(300))));
    m.add_verification_policy_rule(document_rule().into_ref());
    m.add_verification_policy_rule(certificate_rule().into_ref());
    m.add_trust_anchor(h.anchor.clone());
    let validator = ChainValidator::new(Arc::new(m), Arc::new(ScriptedFetcher::new()));
    validator.enable_audit();

    let docs: Vec<_> = (0..4)
        .map(|i| {
            DataBuilder::new(format!("/a/b/doc{i}").as_str())
                .signed_by("/a/b/KEY/ksk-1")
                .sign(&h.ksk)
        })
        .collect();

    let started = Instant::now();
    std::thread::scope(|scope| {
        for doc in &docs {
            let validator = &validator;
            scope.spawn(move || assert!(validator.validate(doc.clone()).is_trusted));
        }
    });
    assert!(started.elapsed() < Duration::from_millis(900), "took {:?}", started.elapsed());

    let audit = validator.take_audit().unwrap();
    let anchor_hits = audit
        .events()
        .iter()
        .filter(|e| matches!(e, AuditEvent::AnchorHit { .. }))
        .count();
    assert_eq!(anchor_hits, 4);
}
