//! Digest helpers used by key derivation, fingerprinting, and legacy
//! `0.0.<alias>` hollow-account address handling.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `RIPEMD160(SHA256(data))`, the master-fingerprint construction used by
/// both BIP-32 and SLIP-10 style hierarchical derivation.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The last 20 bytes of `keccak256(uncompressed_public_key[1..])`, i.e. the
/// external-chain address derived from a secp256k1 public key.
pub fn eth_address(uncompressed_public_key_without_prefix: &[u8]) -> [u8; 20] {
    let digest = keccak256(uncompressed_public_key_without_prefix);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_is_known_vector() {
        let digest = sha256(b"");
        assert_eq!(
            hex::encode(digest),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn eth_address_is_20_bytes() {
        let fake_pubkey = [7u8; 64];
        assert_eq!(eth_address(&fake_pubkey).len(), 20);
    }
}
