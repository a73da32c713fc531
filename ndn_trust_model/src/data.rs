// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::Duration;

use crate::certificate::Certificate;
use crate::key::PublicKey;
use crate::name::Name;

/// Where the verifier should look for the signing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLocator {
    Key(PublicKey),
    Certificate(Arc<Certificate>),
    KeyName(Name),
}

impl KeyLocator {
    /// Name of the signer, if the locator names one.
    ///
    /// An embedded certificate contributes its own name; a bare key has none.
    pub fn signer_name(&self) -> Option<&Name> {
        match self {
            KeyLocator::KeyName(name) => Some(name),
            KeyLocator::Certificate(certificate) => Some(certificate.name()),
            KeyLocator::Key(_) => None,
        }
    }

    pub fn key_name(&self) -> Option<&Name> {
        match self {
            KeyLocator::KeyName(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    key_locator: KeyLocator,
    value: Vec<u8>,
}

impl Signature {
    pub fn new(key_locator: KeyLocator, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key_locator,
            value: value.into(),
        }
    }

    pub fn key_locator(&self) -> &KeyLocator {
        &self.key_locator
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// A decoded, signed Data packet.
///
/// `signed_portion` is the exact byte range the signature covers, as produced
/// by whatever wire codec decoded the packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    name: Name,
    content: Vec<u8>,
    freshness: Option<Duration>,
    signature: Signature,
    signed_portion: Vec<u8>,
}

impl Data {
    pub fn new(
        name: Name,
        content: impl Into<Vec<u8>>,
        freshness: Option<Duration>,
        signature: Signature,
        signed_portion: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name,
            content: content.into(),
            freshness,
            signature,
            signed_portion: signed_portion.into(),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn freshness(&self) -> Option<Duration> {
        self.freshness
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signed_portion(&self) -> &[u8] {
        &self.signed_portion
    }

    pub fn signer_name(&self) -> Option<&Name> {
        self.signature.key_locator.signer_name()
    }
}

/// Canonical signed-portion bytes for packets built without a wire codec.
///
/// Length-prefixed URI of the name, content, and the key locator name when
/// there is one.
pub fn signing_input(name: &Name, content: &[u8], key_locator: &KeyLocator) -> Vec<u8> {
    fn push_field(out: &mut Vec<u8>, field: &[u8]) {
        out.extend_from_slice(&(field.len() as u32).to_be_bytes());
        out.extend_from_slice(field);
    }

    let mut out = Vec::new();
    push_field(&mut out, name.to_uri().as_bytes());
    push_field(&mut out, content);
    match key_locator.signer_name() {
        Some(signer) => push_field(&mut out, signer.to_uri().as_bytes()),
        None => push_field(&mut out, &[]),
    }
    out
}

/// Request for a named packet. The trust core only builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    name: Name,
    lifetime: Option<Duration>,
}

impl Interest {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            lifetime: None,
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }
}
