// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// PKCS#1 `RSAPublicKey`, PKCS#1 v1.5 signatures over SHA-256.
    Rsa,
    /// Uncompressed P-256 point, ASN.1 DER signatures over SHA-256.
    EcdsaP256,
    /// Raw 32-byte Ed25519 key.
    Ed25519,
}

impl FromStr for KeyType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(KeyType::Rsa),
            "ecdsa" | "ecdsa-p256" | "ec" => Ok(KeyType::EcdsaP256),
            "ed25519" => Ok(KeyType::Ed25519),
            other => Err(ModelError::UnknownKeyType(other.to_string())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KeyType::Rsa => "rsa",
            KeyType::EcdsaP256 => "ecdsa-p256",
            KeyType::Ed25519 => "ed25519",
        };
        f.write_str(s)
    }
}

/// Public key material carried by a certificate or trust anchor.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    key_type: KeyType,
    bits: Vec<u8>,
}

impl PublicKey {
    pub fn new(key_type: KeyType, bits: impl Into<Vec<u8>>) -> Self {
        Self {
            key_type,
            bits: bits.into(),
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// SHA-256 of the key bits.
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(&self.bits).into()
    }

    /// Short hex fingerprint used in diagnostics.
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.digest()[..8])
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("key_type", &self.key_type)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}
