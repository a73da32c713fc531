// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};

use crate::key::{KeyType, PublicKey};

/// Checks a signature over a signed portion with a public key.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, signed_portion: &[u8], signature: &[u8], key: &PublicKey) -> bool;
}

/// `ring`-backed verifier for the supported [`KeyType`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct RingSignatureVerifier;

impl RingSignatureVerifier {
    fn algorithm(key_type: KeyType) -> &'static dyn VerificationAlgorithm {
        match key_type {
            KeyType::Rsa => &signature::RSA_PKCS1_2048_8192_SHA256,
            KeyType::EcdsaP256 => &signature::ECDSA_P256_SHA256_ASN1,
            KeyType::Ed25519 => &signature::ED25519,
        }
    }
}

impl SignatureVerifier for RingSignatureVerifier {
    fn verify(&self, signed_portion: &[u8], signature: &[u8], key: &PublicKey) -> bool {
        let algorithm = Self::algorithm(key.key_type());
        UnparsedPublicKey::new(algorithm, key.bits())
            .verify(signed_portion, signature)
            .is_ok()
    }
}
