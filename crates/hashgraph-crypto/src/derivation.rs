//! Hierarchical key derivation: a keyed-pseudorandom-function chain over a
//! master seed, grounded in the same HMAC-chain shape as SLIP-10/BIP-32.
//! secp256k1 derivation delegates to the `bip32` crate; Ed25519 derivation
//! is SLIP-10's hardened-only scheme, hand-rolled over `hmac`/`sha2` the
//! way the rest of this crate's primitives are.

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::error::CryptoError;

type HmacSha512 = Hmac<Sha512>;

/// A derived Ed25519 private key plus the chain code needed to derive
/// further children.
pub struct Ed25519HdNode {
    pub private_key: [u8; 32],
    pub chain_code: [u8; 32],
}

impl Ed25519HdNode {
    pub fn master(seed: &[u8]) -> Self {
        Self::from_hmac_output(&hmac_sha512(b"ed25519 seed", seed))
    }

    /// SLIP-10's Ed25519 derivation only defines hardened children; the
    /// index supplied here is always hardened regardless of its top bit.
    pub fn derive_child(&self, index: u32) -> Self {
        let hardened_index = index | 0x8000_0000;
        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .expect("HMAC accepts a key of any length");
        mac.update(&[0u8]);
        mac.update(&self.private_key);
        mac.update(&hardened_index.to_be_bytes());
        Self::from_hmac_output(&mac.finalize().into_bytes())
    }

    pub fn derive_path(seed: &[u8], path: &[u32]) -> Result<Self, CryptoError> {
        if path.len() > super::key::MAX_KEY_DEPTH {
            return Err(CryptoError::DerivationDepthExceeded);
        }
        let mut node = Self::master(seed);
        for index in path {
            node = node.derive_child(*index);
        }
        Ok(node)
    }

    /// A fingerprint of this node's public key, used to identify which
    /// master a derived child descends from without revealing key material.
    pub fn fingerprint(&self) -> [u8; 4] {
        let signer = crate::signer::Signer::from_ed25519_bytes(&self.private_key);
        let crate::key::Key::Ed25519(pubkey) = signer.public_key() else {
            unreachable!("from_ed25519_bytes always returns an Ed25519 key")
        };
        let digest = crate::hash::hash160(&pubkey);
        [digest[0], digest[1], digest[2], digest[3]]
    }

    fn from_hmac_output(output: &[u8]) -> Self {
        let mut private_key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        private_key.copy_from_slice(&output[..32]);
        chain_code.copy_from_slice(&output[32..64]);
        Self {
            private_key,
            chain_code,
        }
    }
}

fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts a key of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Derives a secp256k1 signing key at `path` (e.g. `"m/44'/3030'/0'/0/0"`)
/// from a BIP-32 master seed.
pub fn derive_ecdsa_secp256k1(seed: &[u8], path: &str) -> Result<k256::ecdsa::SigningKey, CryptoError> {
    let derivation_path: bip32::DerivationPath = path
        .parse()
        .map_err(|_| CryptoError::MalformedPrivateKey("invalid BIP-32 derivation path"))?;
    let xprv = bip32::XPrv::derive_from_path(seed, &derivation_path)
        .map_err(|_| CryptoError::DerivationDepthExceeded)?;
    Ok(xprv.private_key().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_derivation_is_deterministic() {
        let seed = [0x5au8; 32];
        let a = Ed25519HdNode::derive_path(&seed, &[44, 3030, 0, 0, 0]).unwrap();
        let b = Ed25519HdNode::derive_path(&seed, &[44, 3030, 0, 0, 0]).unwrap();
        assert_eq!(a.private_key, b.private_key);
        assert_eq!(a.chain_code, b.chain_code);
    }

    #[test]
    fn different_paths_diverge() {
        let seed = [0x5au8; 32];
        let a = Ed25519HdNode::derive_path(&seed, &[0]).unwrap();
        let b = Ed25519HdNode::derive_path(&seed, &[1]).unwrap();
        assert_ne!(a.private_key, b.private_key);
    }

    #[test]
    fn fingerprint_is_four_bytes_and_stable() {
        let seed = [0x5au8; 32];
        let node = Ed25519HdNode::master(&seed);
        assert_eq!(node.fingerprint(), node.fingerprint());
    }
}
