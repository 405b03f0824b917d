//! Deterministic single-curve signing (C5). Ed25519 signatures are
//! deterministic by construction; secp256k1 signatures use RFC 6979
//! deterministic nonce derivation, matching the teacher's own
//! `ecdsa_sign_hash` behavior, just performed host-side via `k256` instead
//! of a secure-element syscall.

use ed25519_dalek::Signer as _;
use k256::ecdsa::signature::{Signer as _, Verifier as _};

use crate::error::CryptoError;
use crate::key::Key;

pub enum Signer {
    Ed25519(ed25519_dalek::SigningKey),
    EcdsaSecp256k1(k256::ecdsa::SigningKey),
}

impl Signer {
    pub fn generate_ed25519<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        Signer::Ed25519(ed25519_dalek::SigningKey::generate(rng))
    }

    pub fn generate_ecdsa_secp256k1<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        Signer::EcdsaSecp256k1(k256::ecdsa::SigningKey::random(rng))
    }

    pub fn from_ed25519_bytes(bytes: &[u8; 32]) -> Self {
        Signer::Ed25519(ed25519_dalek::SigningKey::from_bytes(bytes))
    }

    pub fn from_ecdsa_secp256k1_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key = k256::ecdsa::SigningKey::from_bytes(bytes.into())
            .map_err(|_| CryptoError::MalformedPrivateKey("not a valid secp256k1 scalar"))?;
        Ok(Signer::EcdsaSecp256k1(signing_key))
    }

    pub fn public_key(&self) -> Key {
        match self {
            Signer::Ed25519(signing_key) => Key::Ed25519(signing_key.verifying_key().to_bytes()),
            Signer::EcdsaSecp256k1(signing_key) => {
                let point = signing_key.verifying_key().to_encoded_point(true);
                let bytes: [u8; 33] = point.as_bytes().try_into().expect("compressed point is 33 bytes");
                Key::EcdsaSecp256k1(bytes)
            }
        }
    }

    /// Signs `body_bytes`, returning a fixed-length raw signature: 64 bytes
    /// for Ed25519, 64 bytes (r || s, no recovery id) for secp256k1.
    pub fn sign(&self, body_bytes: &[u8]) -> Vec<u8> {
        match self {
            Signer::Ed25519(signing_key) => signing_key.sign(body_bytes).to_bytes().to_vec(),
            Signer::EcdsaSecp256k1(signing_key) => {
                let signature: k256::ecdsa::Signature = signing_key.sign(body_bytes);
                signature.to_bytes().to_vec()
            }
        }
    }
}

pub fn verify_ed25519(full_pubkey: &[u8], signature: &[u8], body_bytes: &[u8]) -> bool {
    let Ok(pubkey_bytes) = <[u8; 32]>::try_from(full_pubkey) else {
        return false;
    };
    let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_bytes(&pubkey_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);
    verifying_key.verify(body_bytes, &signature).is_ok()
}

pub fn verify_ecdsa_secp256k1(full_pubkey: &[u8], signature: &[u8], body_bytes: &[u8]) -> bool {
    let Ok(verifying_key) = k256::ecdsa::VerifyingKey::from_sec1_bytes(full_pubkey) else {
        return false;
    };
    let Ok(signature) = k256::ecdsa::Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(body_bytes, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature_map::{CurveKind, SignatureMap};

    #[test]
    fn ed25519_sign_and_verify_round_trip() {
        let signer = Signer::from_ed25519_bytes(&[42u8; 32]);
        let body = b"transaction body bytes";
        let signature = signer.sign(body);
        let Key::Ed25519(pubkey) = signer.public_key() else {
            panic!("expected ed25519 key");
        };
        assert!(verify_ed25519(&pubkey, &signature, body));
        assert!(!verify_ed25519(&pubkey, &signature, b"different body"));
    }

    #[test]
    fn ecdsa_sign_and_verify_round_trip() {
        let signer = Signer::from_ecdsa_secp256k1_bytes(&[7u8; 32]).unwrap();
        let body = b"transaction body bytes";
        let signature = signer.sign(body);
        let Key::EcdsaSecp256k1(pubkey) = signer.public_key() else {
            panic!("expected ecdsa key");
        };
        assert!(verify_ecdsa_secp256k1(&pubkey, &signature, body));
    }

    #[test]
    fn signature_map_verifies_via_key_prefix() {
        let signer = Signer::from_ed25519_bytes(&[1u8; 32]);
        let body = b"body";
        let signature = signer.sign(body);
        let Key::Ed25519(pubkey) = signer.public_key() else {
            unreachable!()
        };

        let mut map = SignatureMap::new();
        map.insert(pubkey.to_vec(), CurveKind::Ed25519, signature);
        assert!(map.verify_ed25519(&pubkey, body));
    }
}
