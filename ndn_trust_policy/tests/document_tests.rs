// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod common;

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use common::{hierarchy, ScriptedFetcher};
use ndn_certificate_cache::StaleReadPolicy;
use ndn_trust_model::RingSignatureVerifier;
use ndn_trust_policy::{ChainValidator, PolicyDocument, PolicyError, PolicyManager, SimplePolicyManager};
use ndn_trust_test_utils::{name, DataBuilder};

fn policy_json(anchor_key: &[u8]) -> String {
    let key = base64::engine::general_purpose::STANDARD.encode(anchor_key);
    format!(
        r#"{{
            "step_limit": 5,
            "certificate_retries": 1,
            "interest_lifetime_ms": 1500,
            "cache": {{ "capacity": 16, "sweep_interval_ms": 250, "reject_stale_reads": true }},
            "verify_policies": [
                {{ "data_regex": "^<a><b><>$", "signer_regex": "^(<a><b>)<KEY><>$",
                   "op": ">", "data_expand": "\\0", "signer_expand": "\\1" }},
                {{ "data_regex": "^(<a><b>)<KEY><><>$", "signer_regex": "^(<a><b>)<KEY><>$",
                   "op": "==", "data_expand": "\\1", "signer_expand": "\\1" }},
                {{ "data_regex": "^(<a><b>)<revoked>$", "signer_regex": "^(<a><b>)<>*$",
                   "op": "==", "data_expand": "\\1", "signer_expand": "\\1", "must_verify": false }}
            ],
            "verify_exemptions": [ {{ "regex": "^<public>" }} ],
            "sign_policies": [
                {{ "data_regex": "^(<>*)<>$", "signer_regex": "^(<>*)<KEY><>$",
                   "op": ">=", "data_expand": "\\1", "signer_expand": "\\1" }}
            ],
            "sign_inferences": [ {{ "regex": "^(<a><b>)<>*$", "expand": "\\1<KEY><dsk-1>" }} ],
            "trust_anchors": [
                {{ "name": "/a/b/KEY/ksk-1", "key_type": "ed25519", "public_key": "{key}" }}
            ]
        }}"#
    )
}

#[test]
fn settings_are_read_with_defaults_for_missing_fields() {
    let empty = PolicyDocument::from_json("{}").unwrap();
    assert_eq!(empty.manager_options().step_limit, 10);
    assert_eq!(empty.cache_options().capacity, 1000);

    let doc = PolicyDocument::from_json(&policy_json(&[1u8; 32])).unwrap();
    let options = doc.manager_options();
    assert_eq!(options.step_limit, 5);
    assert_eq!(options.certificate_retries, 1);
    assert_eq!(options.interest_lifetime, Duration::from_millis(1500));
    let cache = doc.cache_options();
    assert_eq!(cache.capacity, 16);
    assert_eq!(cache.sweep_interval, Duration::from_millis(250));
    assert_eq!(cache.stale_reads, StaleReadPolicy::RejectExpired);
}

#[test]
fn loaded_policy_validates_a_chain() {
    let h = hierarchy();
    let doc = PolicyDocument::from_json(&policy_json(h.ksk.public_key().bits())).unwrap();
    let manager = SimplePolicyManager::from_document(&doc, Arc::new(RingSignatureVerifier)).unwrap();

    assert!(manager.trust_anchor(&name("/a/b/KEY/ksk-1")).is_some());
    assert_eq!(
        manager.infer_signing_identity(&name("/a/b/doc")),
        name("/a/b/KEY/dsk-1")
    );
    assert!(manager.check_signing_policy(&name("/a/b/doc"), &name("/a/b/KEY/dsk-1")));

    let fetcher = Arc::new(ScriptedFetcher::serving(vec![h.dsk_cert.clone()]));
    let validator = ChainValidator::new(Arc::new(manager), fetcher);

    let doc = DataBuilder::new("/a/b/doc")
        .signed_by("/a/b/KEY/dsk-1")
        .sign(&h.dsk);
    assert!(validator.validate(doc).is_trusted);

    let revoked = DataBuilder::new("/a/b/revoked")
        .signed_by("/a/b/KEY/ksk-1")
        .sign(&h.ksk);
    assert!(!validator.validate(revoked).is_trusted);

    let public = DataBuilder::new("/public/notes").sign(&h.dsk);
    assert!(validator.validate(public).is_trusted);
}

#[test]
fn bad_pattern_fails_at_load_time() {
    let doc = PolicyDocument::from_json(
        r#"{ "verify_policies": [ { "data_regex": "^<a", "signer_regex": "^<b>$", "op": ">" } ] }"#,
    )
    .unwrap();
    let result = SimplePolicyManager::from_document(&doc, Arc::new(RingSignatureVerifier));
    assert!(matches!(result, Err(PolicyError::Pattern(_))));
}

#[test]
fn bad_operator_and_anchor_fail_at_load_time() {
    let doc = PolicyDocument::from_json(
        r#"{ "sign_policies": [ { "data_regex": "^<a>$", "signer_regex": "^<b>$", "op": "~" } ] }"#,
    )
    .unwrap();
    assert!(matches!(
        SimplePolicyManager::from_document(&doc, Arc::new(RingSignatureVerifier)),
        Err(PolicyError::UnknownRelation(_))
    ));

    let doc = PolicyDocument::from_json(
        r#"{ "trust_anchors": [ { "name": "/a/KEY/k", "key_type": "ed25519", "public_key": "not base64!" } ] }"#,
    )
    .unwrap();
    assert!(matches!(
        SimplePolicyManager::from_document(&doc, Arc::new(RingSignatureVerifier)),
        Err(PolicyError::InvalidAnchor { .. })
    ));

    let doc = PolicyDocument::from_json(
        r#"{ "trust_anchors": [ { "name": "/a/KEY/k", "key_type": "dsa", "public_key": "AAAA" } ] }"#,
    )
    .unwrap();
    assert!(matches!(
        SimplePolicyManager::from_document(&doc, Arc::new(RingSignatureVerifier)),
        Err(PolicyError::InvalidAnchor { .. })
    ));
}

#[test]
fn unknown_fields_and_malformed_json_are_rejected() {
    assert!(matches!(
        PolicyDocument::from_json(r#"{ "stepLimit": 3 }"#),
        Err(PolicyError::DocumentParse(_))
    ));
    assert!(matches!(
        PolicyDocument::from_json("{"),
        Err(PolicyError::DocumentParse(_))
    ));
}

#[test]
fn missing_file_is_a_read_error() {
    assert!(matches!(
        PolicyDocument::from_path("/nonexistent/ndn-trust-policy.json"),
        Err(PolicyError::DocumentRead(_))
    ));
}
