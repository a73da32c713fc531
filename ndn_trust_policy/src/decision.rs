// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Outcome of verifying a Data packet against the trust policy.
///
/// `reasons` is a human-readable list intended for diagnostics and audit logs.
/// A denial is an ordinary value, never an error: untrusted input fails
/// verification routinely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustDecision {
    /// Whether the data is trusted.
    pub is_trusted: bool,
    /// Diagnostic reasons (denials or trust reasons).
    pub reasons: Vec<String>,
}

impl TrustDecision {
    /// Trusted with a single diagnostic reason.
    pub fn trusted_reason(reason: impl Into<String>) -> Self {
        Self {
            is_trusted: true,
            reasons: vec![reason.into()],
        }
    }

    /// Denied with explicit reasons.
    pub fn denied(reasons: Vec<String>) -> Self {
        Self {
            is_trusted: false,
            reasons,
        }
    }

    /// Denied with a single diagnostic reason.
    pub fn denied_reason(reason: impl Into<String>) -> Self {
        Self::denied(vec![reason.into()])
    }

    /// Prepends context to the reasons, keeping the verdict.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.reasons.insert(0, context.into());
        self
    }
}
