// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ndn_trust_model::{Certificate, Data, Interest};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::audit::{AuditEvent, TrustDecisionAudit, TrustDecisionAuditBuilder};
use crate::manager::{Evaluation, PolicyManager};
use crate::request::{TimeoutOutcome, ValidationRequest};
use crate::TrustDecision;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of one certificate fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Certificate(Arc<Certificate>),
    Timeout,
}

/// Retrieves certificates named by a [`ValidationRequest`]'s interest.
pub trait CertificateFetcher: Send + Sync {
    /// Synchronously fetch a certificate.
    fn fetch(&self, interest: &Interest) -> FetchOutcome;

    /// Asynchronously fetch a certificate.
    ///
    /// Default implementation delegates to the synchronous path.
    fn fetch_async<'a>(&'a self, interest: &'a Interest) -> BoxFuture<'a, FetchOutcome> {
        Box::pin(async move { self.fetch(interest) })
    }
}

/// Drives a [`PolicyManager`] through a whole certificate chain.
///
/// Data no verification rule covers is trusted only when the manager exempts
/// it. Otherwise each hop is evaluated; when a certificate has to be fetched
/// it is itself validated one step deeper before it is used, and timeouts
/// are retried as many times as the request allows.
pub struct ChainValidator {
    manager: Arc<dyn PolicyManager>,
    fetcher: Arc<dyn CertificateFetcher>,
    audit: Mutex<Option<TrustDecisionAuditBuilder>>,
}

impl ChainValidator {
    pub fn new(manager: Arc<dyn PolicyManager>, fetcher: Arc<dyn CertificateFetcher>) -> Self {
        Self {
            manager,
            fetcher,
            audit: Mutex::new(None),
        }
    }

    pub fn manager(&self) -> &Arc<dyn PolicyManager> {
        &self.manager
    }

    /// Starts collecting [`AuditEvent`]s for subsequent validations.
    pub fn enable_audit(&self) {
        *self.audit.lock() = Some(TrustDecisionAuditBuilder::default());
    }

    /// Returns the events collected since auditing was enabled and stops
    /// collecting.
    pub fn take_audit(&self) -> Option<TrustDecisionAudit> {
        self.audit.lock().take().map(TrustDecisionAuditBuilder::build)
    }

    pub fn validate(&self, data: Arc<Data>) -> TrustDecision {
        let decision = self.verify_data(data.clone(), 0);
        log_outcome(&data, &decision);
        decision
    }

    pub fn validate_async<'a>(&'a self, data: Arc<Data>) -> BoxFuture<'a, TrustDecision> {
        Box::pin(async move {
            let decision = self.verify_data_async(data.clone(), 0).await;
            log_outcome(&data, &decision);
            decision
        })
    }

    fn push(&self, event: AuditEvent) {
        if let Some(builder) = self.audit.lock().as_mut() {
            builder.push(event);
        }
    }

    /// Evaluates one hop, recording manager events when auditing is on.
    ///
    /// The shared audit lock is never held across the evaluation itself;
    /// events are collected locally and appended afterwards.
    fn evaluate(&self, data: Arc<Data>, step_count: usize) -> Evaluation {
        if self.audit.lock().is_none() {
            return self.manager.evaluate_with_audit(data, step_count, None);
        }
        let mut local = TrustDecisionAuditBuilder::default();
        let evaluation = self
            .manager
            .evaluate_with_audit(data, step_count, Some(&mut local));
        if let Some(builder) = self.audit.lock().as_mut() {
            builder.append(local);
        }
        evaluation
    }

    /// Handles packets no verification rule covers.
    fn unchecked(&self, data: &Data) -> TrustDecision {
        if self.manager.skip_verify_and_trust(data) {
            self.push(AuditEvent::Exempted {
                data: data.name().clone(),
            });
            return TrustDecision::trusted_reason(format!("{} is exempt from verification", data.name()));
        }
        let decision = TrustDecision::denied_reason(format!("no policy covers {}", data.name()));
        self.push(AuditEvent::Denied {
            data: data.name().clone(),
            decision: decision.clone(),
        });
        decision
    }

    fn verify_data(&self, data: Arc<Data>, step_count: usize) -> TrustDecision {
        if !self.manager.require_verify(&data) {
            return self.unchecked(&data);
        }
        match self.evaluate(data, step_count) {
            Evaluation::Resolved(decision) => decision,
            Evaluation::NeedsFetch(request) => self.complete(request),
        }
    }

    fn complete(&self, mut request: ValidationRequest) -> TrustDecision {
        loop {
            match self.fetcher.fetch(request.interest()) {
                FetchOutcome::Certificate(certificate) => {
                    let hop = self.verify_data(certificate.data().clone(), request.step_count());
                    return self.finish(request, certificate, hop);
                }
                FetchOutcome::Timeout => match self.on_timeout(request) {
                    Ok(retry) => request = retry,
                    Err(decision) => return decision,
                },
            }
        }
    }

    fn verify_data_async<'a>(&'a self, data: Arc<Data>, step_count: usize) -> BoxFuture<'a, TrustDecision> {
        Box::pin(async move {
            if !self.manager.require_verify(&data) {
                return self.unchecked(&data);
            }
            let mut request = match self.evaluate(data, step_count) {
                Evaluation::Resolved(decision) => return decision,
                Evaluation::NeedsFetch(request) => request,
            };
            loop {
                match self.fetcher.fetch_async(request.interest()).await {
                    FetchOutcome::Certificate(certificate) => {
                        let hop = self
                            .verify_data_async(certificate.data().clone(), request.step_count())
                            .await;
                        return self.finish(request, certificate, hop);
                    }
                    FetchOutcome::Timeout => match self.on_timeout(request) {
                        Ok(retry) => request = retry,
                        Err(decision) => return decision,
                    },
                }
            }
        })
    }

    fn on_timeout(&self, request: ValidationRequest) -> Result<ValidationRequest, TrustDecision> {
        let certificate = request.interest().name().clone();
        match request.timed_out() {
            TimeoutOutcome::Retry(retry) => {
                debug!(%certificate, retries_remaining = retry.retries_remaining(), "certificate fetch timed out, retrying");
                self.push(AuditEvent::FetchTimedOut {
                    certificate,
                    retries_remaining: retry.retries_remaining(),
                });
                Ok(retry)
            }
            TimeoutOutcome::Exhausted(decision) => {
                self.push(AuditEvent::FetchTimedOut {
                    certificate,
                    retries_remaining: 0,
                });
                Err(decision)
            }
        }
    }

    fn finish(
        &self,
        request: ValidationRequest,
        certificate: Arc<Certificate>,
        hop: TrustDecision,
    ) -> TrustDecision {
        if !hop.is_trusted {
            return request.certificate_rejected(hop);
        }
        let data = request.data().name().clone();
        let signer = certificate.name().clone();
        let decision = request.certificate_verified(certificate);
        self.push(AuditEvent::SignatureChecked {
            data,
            signer,
            valid: decision.is_trusted,
        });
        decision
    }
}

fn log_outcome(data: &Data, decision: &TrustDecision) {
    if decision.is_trusted {
        info!(data = %data.name(), "data verified");
    } else {
        info!(data = %data.name(), reasons = ?decision.reasons, "data not verified");
    }
}
