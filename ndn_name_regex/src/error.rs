// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Raised while compiling a pattern. Matching itself never fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unbalanced '{delimiter}' at offset {offset} in {expr:?}")]
    Unbalanced {
        expr: String,
        delimiter: char,
        offset: usize,
    },

    #[error("unexpected '{found}' at offset {offset} in {expr:?}")]
    UnexpectedSyntax {
        expr: String,
        found: char,
        offset: usize,
    },

    #[error("invalid repetition {repeat:?} in {expr:?}")]
    BadRepetition { expr: String, repeat: String },

    #[error("invalid component regex {component:?}: {reason}")]
    InvalidComponentRegex { component: String, reason: String },

    #[error("expansion template {template:?} is invalid: {source}")]
    Template {
        template: String,
        #[source]
        source: ExpandError,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("backreference \\{index} exceeds the {available} recorded groups")]
    GroupOutOfRange { index: usize, available: usize },

    #[error("malformed expansion template at offset {offset}")]
    Malformed { offset: usize },

    #[error("invalid literal component <{literal}>")]
    InvalidLiteral { literal: String },
}
