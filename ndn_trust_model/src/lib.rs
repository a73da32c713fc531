// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Boundary types shared by the NDN trust crates.
//!
//! The trust core never parses packets itself. It consumes already decoded
//! [`Data`] packets and [`Certificate`]s, reads their [`Name`]s and signature
//! metadata, and hands signature checks to a [`SignatureVerifier`].

pub mod certificate;
pub mod data;
pub mod error;
pub mod key;
pub mod name;
pub mod verifier;

pub use certificate::Certificate;
pub use data::{signing_input, Data, Interest, KeyLocator, Signature};
pub use error::ModelError;
pub use key::{KeyType, PublicKey};
pub use name::{Name, NameComponent, VERSION_MARKER};
pub use verifier::{RingSignatureVerifier, SignatureVerifier};
