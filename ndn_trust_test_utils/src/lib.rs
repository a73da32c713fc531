// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Fixtures for tests: freshly generated keys and signed packets.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use ndn_trust_model::{
    signing_input, Certificate, Data, KeyLocator, KeyType, Name, NameComponent, PublicKey,
    Signature,
};
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};

/// Parses a name URI, panicking on malformed input.
pub fn name(uri: &str) -> Name {
    Name::from_uri(uri).unwrap_or_else(|e| panic!("bad test name {uri:?}: {e}"))
}

/// `uri` with a version component appended.
pub fn versioned(uri: &str, version: u64) -> Name {
    name(uri).with(NameComponent::from_version(version))
}

/// A generated Ed25519 signing key.
pub struct TestKey {
    key_pair: Ed25519KeyPair,
    pkcs8: Vec<u8>,
    public: PublicKey,
}

impl TestKey {
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).expect("generate ed25519 key");
        let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).expect("parse ed25519 key");
        let public = PublicKey::new(KeyType::Ed25519, key_pair.public_key().as_ref());
        Self {
            key_pair,
            pkcs8: pkcs8.as_ref().to_vec(),
            public,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn pkcs8(&self) -> &[u8] {
        &self.pkcs8
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.key_pair.sign(message).as_ref().to_vec()
    }
}

/// Builds a Data packet signed by a [`TestKey`].
pub struct DataBuilder {
    name: Name,
    content: Vec<u8>,
    freshness: Option<Duration>,
    locator: KeyLocator,
}

impl DataBuilder {
    pub fn new(uri: &str) -> Self {
        Self {
            name: name(uri),
            content: Vec::new(),
            freshness: None,
            locator: KeyLocator::KeyName(Name::new()),
        }
    }

    pub fn content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    pub fn freshness(mut self, freshness: Duration) -> Self {
        self.freshness = Some(freshness);
        self
    }

    /// Key locator naming `key_name`.
    pub fn signed_by(mut self, key_name: &str) -> Self {
        self.locator = KeyLocator::KeyName(name(key_name));
        self
    }

    pub fn locator(mut self, locator: KeyLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn sign(self, key: &TestKey) -> Arc<Data> {
        let signed_portion = signing_input(&self.name, &self.content, &self.locator);
        let value = key.sign(&signed_portion);
        Arc::new(Data::new(
            self.name,
            self.content,
            self.freshness,
            Signature::new(self.locator, value),
            signed_portion,
        ))
    }
}

/// Builds a certificate binding `subject`'s key to a name.
pub struct CertificateBuilder<'a> {
    name: Name,
    subject: &'a TestKey,
    issuer: Option<Name>,
    freshness: Duration,
    not_before: SystemTime,
    not_after: SystemTime,
}

impl<'a> CertificateBuilder<'a> {
    /// Valid from an hour ago for a day, fresh for an hour.
    pub fn new(name: Name, subject: &'a TestKey) -> Self {
        let now = SystemTime::now();
        Self {
            name,
            subject,
            issuer: None,
            freshness: Duration::from_secs(3600),
            not_before: now - Duration::from_secs(3600),
            not_after: now + Duration::from_secs(86_400),
        }
    }

    /// Key name placed in the key locator; defaults to the certificate
    /// name without its version.
    pub fn issued_by(mut self, key_name: &str) -> Self {
        self.issuer = Some(name(key_name));
        self
    }

    pub fn freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn validity(mut self, not_before: SystemTime, not_after: SystemTime) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    pub fn expired(self) -> Self {
        let now = SystemTime::now();
        self.validity(now - Duration::from_secs(7200), now - Duration::from_secs(3600))
    }

    pub fn not_yet_valid(self) -> Self {
        let now = SystemTime::now();
        self.validity(now + Duration::from_secs(3600), now + Duration::from_secs(7200))
    }

    pub fn sign(self, issuer_key: &TestKey) -> Arc<Certificate> {
        let issuer = self.issuer.unwrap_or_else(|| match self.name.last() {
            Some(last) if last.is_version() => self.name.get_prefix(-1),
            _ => self.name.clone(),
        });
        let locator = KeyLocator::KeyName(issuer);
        let content = self.subject.public_key().bits().to_vec();
        let signed_portion = signing_input(&self.name, &content, &locator);
        let value = issuer_key.sign(&signed_portion);
        let data = Data::new(
            self.name,
            content,
            Some(self.freshness),
            Signature::new(locator, value),
            signed_portion,
        );
        Arc::new(Certificate::new(
            data,
            self.subject.public_key().clone(),
            self.not_before,
            self.not_after,
        ))
    }

    /// Signs with the subject's own key.
    pub fn self_signed(self) -> Arc<Certificate> {
        let subject = self.subject;
        self.sign(subject)
    }
}
