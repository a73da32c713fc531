// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndn_name_regex::CompileError;
use ndn_trust_model::ModelError;
use thiserror::Error;

/// Configuration-time failures. Verification itself reports denials as
/// [`crate::TrustDecision`]s instead.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid name pattern: {0}")]
    Pattern(#[from] CompileError),

    #[error("unknown relation operator {0:?}, expected \">\", \">=\" or \"==\"")]
    UnknownRelation(String),

    #[error("invalid name: {0}")]
    Name(#[from] ModelError),

    #[error("invalid trust anchor {name}: {reason}")]
    InvalidAnchor { name: String, reason: String },

    #[error("policy document parse failed: {0}")]
    DocumentParse(#[from] serde_json::Error),

    #[error("policy document read failed: {0}")]
    DocumentRead(#[from] std::io::Error),
}
