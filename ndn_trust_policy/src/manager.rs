// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use ndn_trust_model::{Data, Name};

use crate::audit::TrustDecisionAuditBuilder;
use crate::request::ValidationRequest;
use crate::TrustDecision;

/// Result of checking one hop of a chain.
#[derive(Debug)]
pub enum Evaluation {
    /// Terminal: verified or denied.
    Resolved(TrustDecision),
    /// The signer's certificate has to be fetched before the data can be
    /// verified.
    NeedsFetch(ValidationRequest),
}

impl Evaluation {
    pub fn into_decision(self) -> Option<TrustDecision> {
        match self {
            Evaluation::Resolved(decision) => Some(decision),
            Evaluation::NeedsFetch(_) => None,
        }
    }

    pub fn into_request(self) -> Option<ValidationRequest> {
        match self {
            Evaluation::NeedsFetch(request) => Some(request),
            Evaluation::Resolved(_) => None,
        }
    }
}

/// Decides whether Data may be trusted and which identity may sign what.
///
/// Implementations are configured up front and are read-only afterwards, so
/// a manager can be shared across threads behind an `Arc`.
pub trait PolicyManager: Send + Sync {
    /// Data the policy trusts without verifying.
    fn skip_verify_and_trust(&self, data: &Data) -> bool;

    /// Whether any verification rule pertains to the data's name.
    fn require_verify(&self, data: &Data) -> bool;

    /// One hop of verification at chain depth `step_count`.
    fn evaluate_with_audit(
        &self,
        data: Arc<Data>,
        step_count: usize,
        audit: Option<&mut TrustDecisionAuditBuilder>,
    ) -> Evaluation;

    fn evaluate(&self, data: Arc<Data>, step_count: usize) -> Evaluation {
        self.evaluate_with_audit(data, step_count, None)
    }

    /// Whether the key behind `certificate_name` may sign data named
    /// `data_name`.
    fn check_signing_policy(&self, data_name: &Name, certificate_name: &Name) -> bool;

    /// Identity to sign `data_name` with; empty when none can be inferred.
    fn infer_signing_identity(&self, data_name: &Name) -> Name;
}
