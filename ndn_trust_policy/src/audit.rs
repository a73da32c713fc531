// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndn_trust_model::Name;

use crate::TrustDecision;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    Exempted {
        data: Name,
    },
    RuleMatched {
        data: Name,
        rule: String,
        positive: bool,
    },
    AnchorHit {
        data: Name,
        anchor: Name,
    },
    CacheHit {
        data: Name,
        certificate: Name,
    },
    FetchRequested {
        certificate: Name,
        step_count: usize,
        retries_remaining: u32,
    },
    FetchTimedOut {
        certificate: Name,
        retries_remaining: u32,
    },
    SignatureChecked {
        data: Name,
        signer: Name,
        valid: bool,
    },
    Denied {
        data: Name,
        decision: TrustDecision,
    },
}

#[derive(Debug, Default, Clone)]
pub struct TrustDecisionAudit {
    events: Vec<AuditEvent>,
}

impl TrustDecisionAudit {
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }
}

#[derive(Debug, Default)]
pub struct TrustDecisionAuditBuilder {
    audit: TrustDecisionAudit,
}

impl TrustDecisionAuditBuilder {
    pub fn push(&mut self, event: AuditEvent) {
        self.audit.events.push(event);
    }

    /// Moves every event of `other` to the end of this audit.
    pub fn append(&mut self, other: TrustDecisionAuditBuilder) {
        self.audit.events.extend(other.audit.events);
    }

    pub fn build(self) -> TrustDecisionAudit {
        self.audit
    }
}

/// Pushes `event` when auditing is enabled.
pub(crate) fn record(audit: &mut Option<&mut TrustDecisionAuditBuilder>, event: AuditEvent) {
    if let Some(builder) = audit.as_deref_mut() {
        builder.push(event);
    }
}
