//! Recursive key model: single-curve keys, key lists, threshold keys, and
//! contract-authorization references.

use hashgraph_common::error::DecodeError;
use hashgraph_common::wire::{WireCodec, WireReader, WireWriter};
use hashgraph_common::EntityId;

use crate::signature_map::SignatureMap;

/// Cycles are impossible by construction (this is an owned tree, not a
/// graph), but depth is still bounded to keep verification and signing
/// from blowing the stack on an adversarial or malformed key.
pub const MAX_KEY_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// 32-byte Ed25519 public key.
    Ed25519([u8; 32]),
    /// 33-byte compressed secp256k1 public key.
    EcdsaSecp256k1([u8; 33]),
    KeyList(Vec<Key>),
    ThresholdKey { threshold: u32, keys: Vec<Key> },
    ContractId(EntityId),
    DelegatableContractId(EntityId),
}

impl Key {
    /// Recursively verifies that `sig_map` satisfies this key against
    /// `body_bytes`. Contract references can never be satisfied by an
    /// off-chain signature map; see the spec's own resolution.
    pub fn is_satisfied_by(&self, sig_map: &SignatureMap, body_bytes: &[u8]) -> bool {
        self.is_satisfied_at_depth(sig_map, body_bytes, 0)
    }

    fn is_satisfied_at_depth(&self, sig_map: &SignatureMap, body_bytes: &[u8], depth: usize) -> bool {
        if depth > MAX_KEY_DEPTH {
            return false;
        }
        match self {
            Key::Ed25519(pubkey) => sig_map.verify_ed25519(pubkey, body_bytes),
            Key::EcdsaSecp256k1(pubkey) => sig_map.verify_ecdsa_secp256k1(pubkey, body_bytes),
            Key::KeyList(children) => children
                .iter()
                .all(|k| k.is_satisfied_at_depth(sig_map, body_bytes, depth + 1)),
            Key::ThresholdKey { threshold, keys } => {
                let satisfied = keys
                    .iter()
                    .filter(|k| k.is_satisfied_at_depth(sig_map, body_bytes, depth + 1))
                    .count();
                satisfied >= *threshold as usize
            }
            Key::ContractId(_) | Key::DelegatableContractId(_) => false,
        }
    }

    /// Collects the full public keys of every signing leaf reachable from
    /// this key, used to decide who must sign a transaction. Contract
    /// references contribute no off-chain signer.
    pub fn required_signers(&self) -> Vec<Key> {
        let mut out = Vec::new();
        self.collect_signers(&mut out, 0);
        out
    }

    fn collect_signers(&self, out: &mut Vec<Key>, depth: usize) {
        if depth > MAX_KEY_DEPTH {
            return;
        }
        match self {
            Key::Ed25519(_) | Key::EcdsaSecp256k1(_) => out.push(self.clone()),
            Key::KeyList(children) => {
                for child in children {
                    child.collect_signers(out, depth + 1);
                }
            }
            Key::ThresholdKey { keys, .. } => {
                for child in keys {
                    child.collect_signers(out, depth + 1);
                }
            }
            Key::ContractId(_) | Key::DelegatableContractId(_) => {}
        }
    }

    pub fn threshold(threshold: u32, keys: Vec<Key>) -> Result<Key, DecodeError> {
        if threshold == 0 || threshold as usize > keys.len() {
            return Err(DecodeError::Malformed(
                "threshold must satisfy 1 <= t <= len(keys)",
            ));
        }
        Ok(Key::ThresholdKey { threshold, keys })
    }
}

const TAG_ED25519: u32 = 1;
const TAG_ECDSA_SECP256K1: u32 = 2;
const TAG_KEY_LIST: u32 = 3;
const TAG_THRESHOLD: u32 = 4;
const TAG_CONTRACT_ID: u32 = 5;
const TAG_DELEGATABLE_CONTRACT_ID: u32 = 6;
const TAG_THRESHOLD_VALUE: u32 = 1;
const TAG_THRESHOLD_KEYS: u32 = 2;

impl WireCodec for Key {
    fn encode(&self, w: &mut WireWriter) {
        match self {
            Key::Ed25519(bytes) => w.write_bytes(TAG_ED25519, bytes),
            Key::EcdsaSecp256k1(bytes) => w.write_bytes(TAG_ECDSA_SECP256K1, bytes),
            Key::KeyList(children) => w.write_nested(TAG_KEY_LIST, |child_w| {
                for key in children {
                    child_w.write_nested(1, |kw| key.encode(kw));
                }
            }),
            Key::ThresholdKey { threshold, keys } => w.write_nested(TAG_THRESHOLD, |child_w| {
                child_w.write_varint(TAG_THRESHOLD_VALUE, *threshold as u64);
                child_w.write_nested(TAG_THRESHOLD_KEYS, |list_w| {
                    for key in keys {
                        list_w.write_nested(1, |kw| key.encode(kw));
                    }
                });
            }),
            Key::ContractId(id) => w.write_nested(TAG_CONTRACT_ID, |child_w| id.encode(child_w)),
            Key::DelegatableContractId(id) => {
                w.write_nested(TAG_DELEGATABLE_CONTRACT_ID, |child_w| id.encode(child_w))
            }
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let (field_number, wire_type) = r
            .read_tag()?
            .ok_or(DecodeError::Malformed("empty key payload"))?;

        let key = match field_number {
            TAG_ED25519 => {
                let bytes = r.read_bytes()?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| DecodeError::Malformed("ed25519 key must be 32 bytes"))?;
                Key::Ed25519(arr)
            }
            TAG_ECDSA_SECP256K1 => {
                let bytes = r.read_bytes()?;
                let arr: [u8; 33] = bytes.try_into().map_err(|_| {
                    DecodeError::Malformed("compressed secp256k1 key must be 33 bytes")
                })?;
                Key::EcdsaSecp256k1(arr)
            }
            TAG_KEY_LIST => {
                let bytes = r.read_bytes()?;
                let mut inner = WireReader::new(bytes);
                let mut children = Vec::new();
                while let Some((f, wt)) = inner.read_tag()? {
                    if f == 1 {
                        let item_bytes = inner.read_bytes()?;
                        children.push(Key::decode_from_slice(item_bytes)?);
                    } else {
                        inner.skip_field(wt)?;
                    }
                }
                Key::KeyList(children)
            }
            TAG_THRESHOLD => {
                let bytes = r.read_bytes()?;
                let mut inner = WireReader::new(bytes);
                let mut threshold = 0u32;
                let mut keys = Vec::new();
                while let Some((f, wt)) = inner.read_tag()? {
                    match f {
                        TAG_THRESHOLD_VALUE => threshold = inner.read_varint()? as u32,
                        TAG_THRESHOLD_KEYS => {
                            let list_bytes = inner.read_bytes()?;
                            let mut list_r = WireReader::new(list_bytes);
                            while let Some((lf, lwt)) = list_r.read_tag()? {
                                if lf == 1 {
                                    let item_bytes = list_r.read_bytes()?;
                                    keys.push(Key::decode_from_slice(item_bytes)?);
                                } else {
                                    list_r.skip_field(lwt)?;
                                }
                            }
                        }
                        _ => inner.skip_field(wt)?,
                    }
                }
                Key::ThresholdKey { threshold, keys }
            }
            TAG_CONTRACT_ID => {
                let bytes = r.read_bytes()?;
                Key::ContractId(EntityId::decode_from_slice(bytes)?)
            }
            TAG_DELEGATABLE_CONTRACT_ID => {
                let bytes = r.read_bytes()?;
                Key::DelegatableContractId(EntityId::decode_from_slice(bytes)?)
            }
            _ => {
                r.skip_field(wire_type)?;
                return Err(DecodeError::Malformed("unrecognized key variant tag"));
            }
        };
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature_map::SignatureMap;

    #[test]
    fn single_key_round_trips() {
        let key = Key::Ed25519([7u8; 32]);
        let bytes = key.encode_to_vec();
        assert_eq!(Key::decode_from_slice(&bytes).unwrap(), key);
    }

    #[test]
    fn key_list_round_trips() {
        let key = Key::KeyList(vec![Key::Ed25519([1u8; 32]), Key::EcdsaSecp256k1([2u8; 33])]);
        let bytes = key.encode_to_vec();
        assert_eq!(Key::decode_from_slice(&bytes).unwrap(), key);
    }

    #[test]
    fn threshold_rejects_out_of_range_threshold() {
        assert!(Key::threshold(0, vec![Key::Ed25519([0u8; 32])]).is_err());
        assert!(Key::threshold(2, vec![Key::Ed25519([0u8; 32])]).is_err());
    }

    #[test]
    fn threshold_satisfied_with_enough_children() {
        let a = Key::Ed25519([1u8; 32]);
        let b = Key::Ed25519([2u8; 32]);
        let key = Key::threshold(1, vec![a.clone(), b.clone()]).unwrap();
        let empty = SignatureMap::new();
        // Neither child has a real signature in the map, so the threshold of
        // 1 is not met by an empty map.
        assert!(!key.is_satisfied_by(&empty, b"body"));
    }

    #[test]
    fn contract_reference_never_satisfied_off_chain() {
        let key = Key::ContractId(hashgraph_common::EntityId::new(0, 0, 1234));
        let empty = SignatureMap::new();
        assert!(!key.is_satisfied_by(&empty, b"body"));
    }

    #[test]
    fn required_signers_flattens_nested_structure() {
        let leaf_a = Key::Ed25519([1u8; 32]);
        let leaf_b = Key::EcdsaSecp256k1([2u8; 33]);
        let nested = Key::KeyList(vec![
            leaf_a.clone(),
            Key::threshold(1, vec![leaf_b.clone()]).unwrap(),
            Key::ContractId(hashgraph_common::EntityId::new(0, 0, 7)),
        ]);
        let signers = nested.required_signers();
        assert_eq!(signers, vec![leaf_a, leaf_b]);
    }
}
