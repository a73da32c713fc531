// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use ndn_certificate_cache::CertificateCache;
use ndn_trust_model::{Certificate, Data, Interest, SignatureVerifier};
use tracing::{debug, trace};

use crate::TrustDecision;

/// Checks `data`'s signature with `certificate`'s key.
pub(crate) fn verify_with(
    verifier: &dyn SignatureVerifier,
    data: &Data,
    certificate: &Certificate,
) -> TrustDecision {
    let valid = verifier.verify(
        data.signed_portion(),
        data.signature().value(),
        certificate.public_key(),
    );
    trace!(data = %data.name(), signer = %certificate.name(), valid, "checked signature");
    if valid {
        TrustDecision::trusted_reason(format!(
            "{} verified with {}",
            data.name(),
            certificate.name()
        ))
    } else {
        TrustDecision::denied_reason(format!(
            "signature of {} does not verify with {}",
            data.name(),
            certificate.name()
        ))
    }
}

/// A pending certificate fetch for one hop of a chain.
///
/// The caller issues [`ValidationRequest::interest`], then completes the
/// request with exactly one of [`ValidationRequest::certificate_verified`],
/// [`ValidationRequest::certificate_rejected`], or (after a timeout)
/// [`ValidationRequest::timed_out`]. Dropping the request abandons the chain.
pub struct ValidationRequest {
    interest: Interest,
    retries_remaining: u32,
    step_count: usize,
    data: Arc<Data>,
    cache: Arc<dyn CertificateCache>,
    verifier: Arc<dyn SignatureVerifier>,
}

/// What to do after a fetch timed out.
#[derive(Debug)]
pub enum TimeoutOutcome {
    /// Re-issue the same interest.
    Retry(ValidationRequest),
    /// No retries left.
    Exhausted(TrustDecision),
}

impl ValidationRequest {
    pub(crate) fn new(
        interest: Interest,
        retries_remaining: u32,
        step_count: usize,
        data: Arc<Data>,
        cache: Arc<dyn CertificateCache>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            interest,
            retries_remaining,
            step_count,
            data,
            cache,
            verifier,
        }
    }

    pub fn interest(&self) -> &Interest {
        &self.interest
    }

    pub fn retries_remaining(&self) -> u32 {
        self.retries_remaining
    }

    /// Chain depth at which the fetched certificate must itself be
    /// evaluated.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// The packet waiting on this certificate.
    pub fn data(&self) -> &Arc<Data> {
        &self.data
    }

    pub fn timed_out(mut self) -> TimeoutOutcome {
        if self.retries_remaining == 0 {
            debug!(certificate = %self.interest.name(), "certificate fetch retries exhausted");
            return TimeoutOutcome::Exhausted(TrustDecision::denied_reason(format!(
                "fetching {} timed out",
                self.interest.name()
            )));
        }
        self.retries_remaining -= 1;
        TimeoutOutcome::Retry(self)
    }

    /// Completes the hop with a certificate the caller has already
    /// validated: it is cached when inside its validity window, then the
    /// waiting packet is verified with its key.
    pub fn certificate_verified(self, certificate: Arc<Certificate>) -> TrustDecision {
        if !self.interest.name().is_prefix_of(certificate.name()) {
            return TrustDecision::denied_reason(format!(
                "certificate {} does not answer {}",
                certificate.name(),
                self.interest.name()
            ));
        }

        if certificate.is_valid_at(SystemTime::now()) {
            self.cache.insert_certificate(certificate.clone());
        } else {
            debug!(certificate = %certificate.name(), "not caching certificate outside its validity window");
        }

        verify_with(self.verifier.as_ref(), &self.data, &certificate)
    }

    /// Completes the hop after the fetched certificate itself failed
    /// validation.
    pub fn certificate_rejected(self, cause: TrustDecision) -> TrustDecision {
        TrustDecision::denied(cause.reasons).with_context(format!(
            "signer certificate for {} is not trusted",
            self.data.name()
        ))
    }
}

impl fmt::Debug for ValidationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRequest")
            .field("interest", &self.interest)
            .field("retries_remaining", &self.retries_remaining)
            .field("step_count", &self.step_count)
            .field("data", self.data.name())
            .finish()
    }
}
