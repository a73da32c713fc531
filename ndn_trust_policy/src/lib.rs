// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Trust-schema policy for NDN Data verification.
//!
//! A [`SimplePolicyManager`] holds ordered [`PolicyRule`]s relating data names
//! to the names of the keys allowed to sign them, a set of trust anchors, and
//! a certificate cache. [`PolicyManager::evaluate`] checks one hop of a
//! certificate chain: it either resolves to a [`TrustDecision`] or returns a
//! [`ValidationRequest`] naming the certificate the caller must fetch next.
//!
//! [`ChainValidator`] is a ready-made driver for that loop on top of a
//! [`CertificateFetcher`].

pub mod audit;
pub mod decision;
pub mod document;
pub mod error;
pub mod manager;
pub mod no_verify;
pub mod options;
pub mod request;
pub mod rule;
pub mod simple;
pub mod validator;

pub use audit::{AuditEvent, TrustDecisionAudit, TrustDecisionAuditBuilder};
pub use decision::TrustDecision;
pub use document::PolicyDocument;
pub use error::PolicyError;
pub use manager::{Evaluation, PolicyManager};
pub use no_verify::NoVerifyPolicyManager;
pub use options::PolicyManagerOptions;
pub use request::{TimeoutOutcome, ValidationRequest};
pub use rule::{IdentityPolicyRule, NameRelation, PolicyRule, PolicyRuleRef};
pub use simple::SimplePolicyManager;
pub use validator::{BoxFuture, CertificateFetcher, ChainValidator, FetchOutcome};
