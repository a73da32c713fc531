// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ndn_name_regex::NamePattern;
use ndn_trust_model::{Data, Name};

use crate::error::PolicyError;

/// A trust-schema predicate over (data name, signer name) pairs.
pub trait PolicyRule: Send + Sync + fmt::Debug {
    /// Label used in diagnostics.
    fn name(&self) -> &str;

    /// Positive rules must hold for data to verify; negative rules deny data
    /// they hold for.
    fn is_positive(&self) -> bool;

    /// Whether the rule pertains to this data name at all.
    fn match_data_name(&self, data: &Data) -> bool;

    fn match_signer_name(&self, data: &Data) -> bool;

    fn satisfy_names(&self, data_name: &Name, signer_name: &Name) -> bool;

    /// [`PolicyRule::satisfy_names`] with the signer taken from the data's
    /// key locator. A locator without a name checks against the empty name.
    fn satisfy(&self, data: &Data) -> bool {
        let signer = data.signer_name().cloned().unwrap_or_default();
        self.satisfy_names(data.name(), &signer)
    }
}

pub type PolicyRuleRef = Arc<dyn PolicyRule>;

/// How the expanded signer name must relate to the expanded data name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRelation {
    /// `==`
    Equal,
    /// `>`: the signer is a proper prefix of the data.
    StrictPrefix,
    /// `>=`: the signer is a prefix of, or equal to, the data.
    PrefixOrEqual,
}

impl NameRelation {
    pub fn holds(self, signer: &Name, data: &Name) -> bool {
        match self {
            NameRelation::Equal => signer == data,
            NameRelation::StrictPrefix => signer.size() < data.size() && signer.is_prefix_of(data),
            NameRelation::PrefixOrEqual => signer.is_prefix_of(data),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NameRelation::Equal => "==",
            NameRelation::StrictPrefix => ">",
            NameRelation::PrefixOrEqual => ">=",
        }
    }
}

impl FromStr for NameRelation {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" => Ok(NameRelation::Equal),
            ">" => Ok(NameRelation::StrictPrefix),
            ">=" => Ok(NameRelation::PrefixOrEqual),
            other => Err(PolicyError::UnknownRelation(other.to_string())),
        }
    }
}

impl fmt::Display for NameRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relates the data name to the signer name through two patterns, each
/// expanded with its own template, compared with a [`NameRelation`].
///
/// Both patterns and both templates are compiled and checked when the rule
/// is built, so a malformed rule fails at configuration time.
#[derive(Debug, Clone)]
pub struct IdentityPolicyRule {
    label: String,
    data_pattern: NamePattern,
    signer_pattern: NamePattern,
    relation: NameRelation,
    positive: bool,
}

impl IdentityPolicyRule {
    pub fn new(
        data_regex: &str,
        signer_regex: &str,
        op: &str,
        data_expand: &str,
        signer_expand: &str,
        positive: bool,
    ) -> Result<Self, PolicyError> {
        let relation: NameRelation = op.parse()?;
        let data_pattern = NamePattern::with_expand(data_regex, data_expand)?;
        let signer_pattern = NamePattern::with_expand(signer_regex, signer_expand)?;
        Ok(Self {
            label: format!("{data_pattern} {relation} {signer_pattern}"),
            data_pattern,
            signer_pattern,
            relation,
            positive,
        })
    }

    pub fn relation(&self) -> NameRelation {
        self.relation
    }

    pub fn data_pattern(&self) -> &NamePattern {
        &self.data_pattern
    }

    pub fn signer_pattern(&self) -> &NamePattern {
        &self.signer_pattern
    }

    pub fn into_ref(self) -> PolicyRuleRef {
        Arc::new(self)
    }
}

impl PolicyRule for IdentityPolicyRule {
    fn name(&self) -> &str {
        &self.label
    }

    fn is_positive(&self) -> bool {
        self.positive
    }

    fn match_data_name(&self, data: &Data) -> bool {
        self.data_pattern.matches(data.name())
    }

    fn match_signer_name(&self, data: &Data) -> bool {
        let signer = data.signer_name().cloned().unwrap_or_default();
        self.signer_pattern.matches(&signer)
    }

    fn satisfy_names(&self, data_name: &Name, signer_name: &Name) -> bool {
        let Some(data_match) = self.data_pattern.match_name(data_name) else {
            return false;
        };
        let Some(signer_match) = self.signer_pattern.match_name(signer_name) else {
            return false;
        };
        match (
            self.data_pattern.expand(&data_match),
            self.signer_pattern.expand(&signer_match),
        ) {
            (Ok(expanded_data), Ok(expanded_signer)) => {
                self.relation.holds(&expanded_signer, &expanded_data)
            }
            _ => false,
        }
    }
}
