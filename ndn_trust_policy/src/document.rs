// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use base64::Engine;
use ndn_certificate_cache::{StaleReadPolicy, TtlCacheOptions};
use ndn_name_regex::NamePattern;
use ndn_trust_model::{Certificate, Data, KeyLocator, KeyType, Name, PublicKey, Signature};
use serde::Deserialize;

use crate::error::PolicyError;
use crate::options::PolicyManagerOptions;
use crate::rule::IdentityPolicyRule;
use crate::simple::SimplePolicyManager;

/// 9999-12-31T23:59:59Z, the open end of an anchor without `not_after`.
const FAR_FUTURE_SECS: u64 = 253_402_300_799;

/// JSON trust policy.
///
/// ```json
/// {
///   "step_limit": 10,
///   "verify_policies": [
///     { "data_regex": "^<a><b><>$", "signer_regex": "^(<a><b>)<KEY><>$",
///       "op": ">", "data_expand": "\\0", "signer_expand": "\\1" }
///   ],
///   "trust_anchors": [
///     { "name": "/a/b/KEY/ksk-1", "key_type": "ed25519", "public_key": "<base64>" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyDocument {
    pub step_limit: Option<usize>,
    pub certificate_retries: Option<u32>,
    pub interest_lifetime_ms: Option<u64>,
    pub cache: CacheSettings,
    pub verify_policies: Vec<RuleSpec>,
    pub verify_exemptions: Vec<PatternSpec>,
    pub sign_policies: Vec<RuleSpec>,
    pub sign_inferences: Vec<PatternSpec>,
    pub trust_anchors: Vec<AnchorSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    pub capacity: Option<usize>,
    pub sweep_interval_ms: Option<u64>,
    pub reject_stale_reads: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub data_regex: String,
    pub signer_regex: String,
    pub op: String,
    #[serde(default)]
    pub data_expand: String,
    #[serde(default)]
    pub signer_expand: String,
    /// `false` turns the rule into a deny rule.
    #[serde(default = "default_must_verify")]
    pub must_verify: bool,
}

fn default_must_verify() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    pub regex: String,
    #[serde(default)]
    pub expand: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorSpec {
    pub name: String,
    pub key_type: String,
    /// Standard base64 of the key bits.
    pub public_key: String,
    pub not_before_unix: Option<u64>,
    pub not_after_unix: Option<u64>,
}

impl PolicyDocument {
    pub fn from_json(text: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn manager_options(&self) -> PolicyManagerOptions {
        let defaults = PolicyManagerOptions::default();
        PolicyManagerOptions {
            step_limit: self.step_limit.unwrap_or(defaults.step_limit),
            certificate_retries: self
                .certificate_retries
                .unwrap_or(defaults.certificate_retries),
            interest_lifetime: self
                .interest_lifetime_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.interest_lifetime),
        }
    }

    pub fn cache_options(&self) -> TtlCacheOptions {
        let defaults = TtlCacheOptions::default();
        TtlCacheOptions {
            capacity: self.cache.capacity.unwrap_or(defaults.capacity),
            sweep_interval: self
                .cache
                .sweep_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.sweep_interval),
            stale_reads: if self.cache.reject_stale_reads {
                StaleReadPolicy::RejectExpired
            } else {
                StaleReadPolicy::ServeUntilSwept
            },
        }
    }

    /// Compiles every rule, pattern and anchor and adds them to `manager`.
    /// Nothing is added if any entry is invalid.
    pub fn apply_to(&self, manager: &mut SimplePolicyManager) -> Result<(), PolicyError> {
        let verify_rules = compile_rules(&self.verify_policies)?;
        let sign_rules = compile_rules(&self.sign_policies)?;
        let exemptions = compile_patterns(&self.verify_exemptions)?;
        let inferences = compile_patterns(&self.sign_inferences)?;
        let anchors = self
            .trust_anchors
            .iter()
            .map(AnchorSpec::to_certificate)
            .collect::<Result<Vec<_>, _>>()?;

        for rule in verify_rules {
            manager.add_verification_policy_rule(rule.into_ref());
        }
        for rule in sign_rules {
            manager.add_signing_policy_rule(rule.into_ref());
        }
        for pattern in exemptions {
            manager.add_verification_exemption(pattern);
        }
        for pattern in inferences {
            manager.add_signing_inference(pattern);
        }
        for anchor in anchors {
            manager.add_trust_anchor(anchor);
        }
        Ok(())
    }
}

fn compile_rules(specs: &[RuleSpec]) -> Result<Vec<IdentityPolicyRule>, PolicyError> {
    specs
        .iter()
        .map(|spec| {
            IdentityPolicyRule::new(
                &spec.data_regex,
                &spec.signer_regex,
                &spec.op,
                &spec.data_expand,
                &spec.signer_expand,
                spec.must_verify,
            )
        })
        .collect()
}

fn compile_patterns(specs: &[PatternSpec]) -> Result<Vec<NamePattern>, PolicyError> {
    specs
        .iter()
        .map(|spec| NamePattern::with_expand(&spec.regex, &spec.expand).map_err(PolicyError::from))
        .collect()
}

impl AnchorSpec {
    fn to_certificate(&self) -> Result<Arc<Certificate>, PolicyError> {
        let invalid = |reason: String| PolicyError::InvalidAnchor {
            name: self.name.clone(),
            reason,
        };

        let name = Name::from_uri(&self.name)?;
        let key_type: KeyType = self
            .key_type
            .parse()
            .map_err(|e: ndn_trust_model::ModelError| invalid(e.to_string()))?;
        let bits = base64::engine::general_purpose::STANDARD
            .decode(self.public_key.trim())
            .map_err(|e| invalid(format!("public_key is not base64: {e}")))?;
        if bits.is_empty() {
            return Err(invalid("public_key is empty".to_string()));
        }

        let not_before = UNIX_EPOCH + Duration::from_secs(self.not_before_unix.unwrap_or(0));
        let not_after =
            UNIX_EPOCH + Duration::from_secs(self.not_after_unix.unwrap_or(FAR_FUTURE_SECS));
        if not_after < not_before {
            return Err(invalid("not_after precedes not_before".to_string()));
        }

        let public_key = PublicKey::new(key_type, bits.clone());
        let data = Data::new(
            name,
            bits,
            None,
            Signature::new(KeyLocator::Key(public_key.clone()), Vec::new()),
            Vec::new(),
        );
        Ok(Arc::new(Certificate::new(
            data,
            public_key,
            not_before,
            not_after,
        )))
    }
}
