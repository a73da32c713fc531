// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use ndn_trust_model::{Data, Name};

use crate::audit::TrustDecisionAuditBuilder;
use crate::manager::{Evaluation, PolicyManager};
use crate::TrustDecision;

/// Trusts every packet and allows every signing. For tests and closed
/// deployments only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVerifyPolicyManager;

impl PolicyManager for NoVerifyPolicyManager {
    fn skip_verify_and_trust(&self, _data: &Data) -> bool {
        true
    }

    fn require_verify(&self, _data: &Data) -> bool {
        false
    }

    fn evaluate_with_audit(
        &self,
        _data: Arc<Data>,
        _step_count: usize,
        _audit: Option<&mut TrustDecisionAuditBuilder>,
    ) -> Evaluation {
        Evaluation::Resolved(TrustDecision::trusted_reason("verification disabled"))
    }

    fn check_signing_policy(&self, _data_name: &Name, _certificate_name: &Name) -> bool {
        true
    }

    fn infer_signing_identity(&self, _data_name: &Name) -> Name {
        Name::new()
    }
}
