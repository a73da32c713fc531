// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;
use std::sync::Arc;

use ndn_certificate_cache::{CertificateCache, TtlCacheOptions, TtlCertificateCache};
use ndn_name_regex::NamePattern;
use ndn_trust_model::{Certificate, Data, Interest, Name, SignatureVerifier};
use tracing::{debug, info, warn};

use crate::audit::{record, AuditEvent, TrustDecisionAuditBuilder};
use crate::document::PolicyDocument;
use crate::error::PolicyError;
use crate::manager::{Evaluation, PolicyManager};
use crate::options::PolicyManagerOptions;
use crate::request::{verify_with, ValidationRequest};
use crate::rule::PolicyRuleRef;
use crate::TrustDecision;

/// Rule-list policy manager.
///
/// Verification rules are tried in the order they were added. Negative rules
/// are checked before positive ones and always win.
pub struct SimplePolicyManager {
    options: PolicyManagerOptions,
    verify_policies: Vec<PolicyRuleRef>,
    must_fail_verify: Vec<PolicyRuleRef>,
    verify_exemptions: Vec<NamePattern>,
    sign_policies: Vec<PolicyRuleRef>,
    must_fail_sign: Vec<PolicyRuleRef>,
    sign_inferences: Vec<NamePattern>,
    trust_anchors: HashMap<Name, Arc<Certificate>>,
    cache: Arc<dyn CertificateCache>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl SimplePolicyManager {
    pub fn new(cache: Arc<dyn CertificateCache>, verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self::with_options(PolicyManagerOptions::default(), cache, verifier)
    }

    pub fn with_options(
        options: PolicyManagerOptions,
        cache: Arc<dyn CertificateCache>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            options,
            verify_policies: Vec::new(),
            must_fail_verify: Vec::new(),
            verify_exemptions: Vec::new(),
            sign_policies: Vec::new(),
            must_fail_sign: Vec::new(),
            sign_inferences: Vec::new(),
            trust_anchors: HashMap::new(),
            cache,
            verifier,
        }
    }

    /// Builds a manager, and the TTL cache it uses, from a policy document.
    pub fn from_document(
        document: &PolicyDocument,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Result<Self, PolicyError> {
        let cache_options: TtlCacheOptions = document.cache_options();
        let cache = Arc::new(TtlCertificateCache::new(cache_options));
        let mut manager = Self::with_options(document.manager_options(), cache, verifier);
        document.apply_to(&mut manager)?;
        info!(
            verify_rules = manager.verify_policies.len() + manager.must_fail_verify.len(),
            sign_rules = manager.sign_policies.len() + manager.must_fail_sign.len(),
            anchors = manager.trust_anchors.len(),
            "loaded trust policy"
        );
        Ok(manager)
    }

    pub fn options(&self) -> &PolicyManagerOptions {
        &self.options
    }

    pub fn cache(&self) -> &Arc<dyn CertificateCache> {
        &self.cache
    }

    pub fn add_verification_policy_rule(&mut self, rule: PolicyRuleRef) {
        if rule.is_positive() {
            self.verify_policies.push(rule);
        } else {
            self.must_fail_verify.push(rule);
        }
    }

    pub fn add_signing_policy_rule(&mut self, rule: PolicyRuleRef) {
        if rule.is_positive() {
            self.sign_policies.push(rule);
        } else {
            self.must_fail_sign.push(rule);
        }
    }

    /// Data whose name matches `pattern` is trusted without verification
    /// unless a verification rule covers it.
    pub fn add_verification_exemption(&mut self, pattern: NamePattern) {
        self.verify_exemptions.push(pattern);
    }

    /// `pattern`'s default expansion yields the signing identity for
    /// matching data names.
    pub fn add_signing_inference(&mut self, pattern: NamePattern) {
        self.sign_inferences.push(pattern);
    }

    /// Registers an anchor under its exact certificate name.
    pub fn add_trust_anchor(&mut self, certificate: Arc<Certificate>) {
        self.trust_anchors
            .insert(certificate.name().clone(), certificate);
    }

    pub fn trust_anchor(&self, name: &Name) -> Option<&Arc<Certificate>> {
        self.trust_anchors.get(name)
    }

    fn deny(
        audit: &mut Option<&mut TrustDecisionAuditBuilder>,
        data: &Data,
        reason: String,
    ) -> Evaluation {
        debug!(data = %data.name(), %reason, "verification denied");
        let decision = TrustDecision::denied_reason(reason);
        record(
            audit,
            AuditEvent::Denied {
                data: data.name().clone(),
                decision: decision.clone(),
            },
        );
        Evaluation::Resolved(decision)
    }

    fn check_signature(
        &self,
        audit: &mut Option<&mut TrustDecisionAuditBuilder>,
        data: &Data,
        certificate: &Certificate,
    ) -> Evaluation {
        let decision = verify_with(self.verifier.as_ref(), data, certificate);
        record(
            audit,
            AuditEvent::SignatureChecked {
                data: data.name().clone(),
                signer: certificate.name().clone(),
                valid: decision.is_trusted,
            },
        );
        Evaluation::Resolved(decision)
    }
}

impl PolicyManager for SimplePolicyManager {
    fn skip_verify_and_trust(&self, data: &Data) -> bool {
        self.verify_exemptions
            .iter()
            .any(|pattern| pattern.matches(data.name()))
    }

    fn require_verify(&self, data: &Data) -> bool {
        self.verify_policies
            .iter()
            .chain(&self.must_fail_verify)
            .any(|rule| rule.match_data_name(data))
    }

    fn evaluate_with_audit(
        &self,
        data: Arc<Data>,
        step_count: usize,
        mut audit: Option<&mut TrustDecisionAuditBuilder>,
    ) -> Evaluation {
        if step_count >= self.options.step_limit {
            return Self::deny(
                &mut audit,
                &data,
                format!("certificate chain reached the step limit of {}", self.options.step_limit),
            );
        }

        let signer = data.signer_name().cloned().unwrap_or_default();

        if let Some(rule) = self
            .must_fail_verify
            .iter()
            .find(|rule| rule.match_data_name(&data) && rule.satisfy_names(data.name(), &signer))
        {
            record(
                &mut audit,
                AuditEvent::RuleMatched {
                    data: data.name().clone(),
                    rule: rule.name().to_string(),
                    positive: false,
                },
            );
            return Self::deny(&mut audit, &data, format!("matched deny rule {}", rule.name()));
        }

        let Some(rule) = self
            .verify_policies
            .iter()
            .find(|rule| rule.satisfy_names(data.name(), &signer))
        else {
            return Self::deny(
                &mut audit,
                &data,
                format!("no verification rule allows {signer} to sign {}", data.name()),
            );
        };
        record(
            &mut audit,
            AuditEvent::RuleMatched {
                data: data.name().clone(),
                rule: rule.name().to_string(),
                positive: true,
            },
        );

        let Some(key_name) = data.signature().key_locator().key_name() else {
            return Self::deny(
                &mut audit,
                &data,
                "key locator does not name a key".to_string(),
            );
        };

        if let Some(anchor) = self.trust_anchors.get(key_name) {
            record(
                &mut audit,
                AuditEvent::AnchorHit {
                    data: data.name().clone(),
                    anchor: anchor.name().clone(),
                },
            );
            return self.check_signature(&mut audit, &data, anchor);
        }

        if let Some(certificate) = self.cache.get_certificate(key_name) {
            record(
                &mut audit,
                AuditEvent::CacheHit {
                    data: data.name().clone(),
                    certificate: certificate.name().clone(),
                },
            );
            return self.check_signature(&mut audit, &data, &certificate);
        }

        let interest = Interest::new(key_name.clone()).with_lifetime(self.options.interest_lifetime);
        record(
            &mut audit,
            AuditEvent::FetchRequested {
                certificate: key_name.clone(),
                step_count: step_count + 1,
                retries_remaining: self.options.certificate_retries,
            },
        );
        debug!(data = %data.name(), certificate = %key_name, step_count, "signer certificate needed");
        Evaluation::NeedsFetch(ValidationRequest::new(
            interest,
            self.options.certificate_retries,
            step_count + 1,
            data,
            self.cache.clone(),
            self.verifier.clone(),
        ))
    }

    fn check_signing_policy(&self, data_name: &Name, certificate_name: &Name) -> bool {
        if self
            .must_fail_sign
            .iter()
            .any(|rule| rule.satisfy_names(data_name, certificate_name))
        {
            return false;
        }
        self.sign_policies
            .iter()
            .any(|rule| rule.satisfy_names(data_name, certificate_name))
    }

    fn infer_signing_identity(&self, data_name: &Name) -> Name {
        for pattern in &self.sign_inferences {
            let Some(m) = pattern.match_name(data_name) else {
                continue;
            };
            match pattern.expand(&m) {
                Ok(identity) => return identity,
                Err(e) => warn!(pattern = %pattern, error = %e, "signing inference expansion failed"),
            }
        }
        Name::new()
    }
}
