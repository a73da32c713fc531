// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid percent escape in name component: {0}")]
    InvalidEscape(String),

    #[error("name component of {0} periods cannot be represented")]
    IllegalPeriodComponent(usize),

    #[error("name component is not a version component")]
    NotAVersion,

    #[error("unknown key type: {0}")]
    UnknownKeyType(String),
}
