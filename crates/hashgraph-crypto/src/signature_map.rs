//! Deduplicated mapping from public-key prefix to signature over one
//! body-bytes blob. Prefixes are the shortest leading byte sequence that
//! uniquely identifies a signer among everyone currently in the map;
//! inserting a colliding key retroactively extends the prefixes already
//! stored.

use hashgraph_common::error::DecodeError;
use hashgraph_common::wire::{WireCodec, WireReader, WireWriter};

use crate::signer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Ed25519,
    EcdsaSecp256k1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    /// The full public key for locally-assembled maps; for maps decoded
    /// off the wire this is only as many bytes as were actually sent (the
    /// prefix), since the wire form never carries the full key.
    full_public_key: Vec<u8>,
    prefix_len: usize,
    pub signature: Vec<u8>,
    pub curve: CurveKind,
}

impl SignatureEntry {
    pub fn prefix(&self) -> &[u8] {
        &self.full_public_key[..self.prefix_len]
    }

    pub fn full_public_key(&self) -> &[u8] {
        &self.full_public_key
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureMap {
    entries: Vec<SignatureEntry>,
}

impl SignatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SignatureEntry] {
        &self.entries
    }

    /// Adds or replaces a signer's signature, re-deriving every stored
    /// entry's prefix afterward so the shortest-unique-prefix invariant
    /// holds over the full set again.
    pub fn insert(&mut self, full_public_key: Vec<u8>, curve: CurveKind, signature: Vec<u8>) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.full_public_key == full_public_key)
        {
            existing.signature = signature;
            return;
        }
        self.entries.push(SignatureEntry {
            full_public_key,
            prefix_len: 1,
            signature,
            curve,
        });
        self.recompute_prefixes();
    }

    fn recompute_prefixes(&mut self) {
        let n = self.entries.len();
        let mut new_lengths = vec![1usize; n];
        for i in 0..n {
            let full_i = &self.entries[i].full_public_key;
            let mut len = 1usize;
            loop {
                let collides = (0..n).any(|j| {
                    if i == j {
                        return false;
                    }
                    let full_j = &self.entries[j].full_public_key;
                    full_i.len() >= len && full_j.len() >= len && full_i[..len] == full_j[..len]
                });
                if !collides || len >= full_i.len() {
                    break;
                }
                len += 1;
            }
            new_lengths[i] = len;
        }
        for (entry, len) in self.entries.iter_mut().zip(new_lengths) {
            entry.prefix_len = len;
        }
    }

    pub fn verify_ed25519(&self, full_pubkey: &[u8; 32], body_bytes: &[u8]) -> bool {
        self.verify_curve(full_pubkey, CurveKind::Ed25519, body_bytes)
    }

    pub fn verify_ecdsa_secp256k1(&self, full_pubkey: &[u8; 33], body_bytes: &[u8]) -> bool {
        self.verify_curve(full_pubkey, CurveKind::EcdsaSecp256k1, body_bytes)
    }

    fn verify_curve(&self, full_pubkey: &[u8], curve: CurveKind, body_bytes: &[u8]) -> bool {
        for entry in &self.entries {
            if entry.curve != curve || !full_pubkey.starts_with(entry.prefix()) {
                continue;
            }
            let verified = match curve {
                CurveKind::Ed25519 => {
                    signer::verify_ed25519(full_pubkey, &entry.signature, body_bytes)
                }
                CurveKind::EcdsaSecp256k1 => {
                    signer::verify_ecdsa_secp256k1(full_pubkey, &entry.signature, body_bytes)
                }
            };
            if verified {
                return true;
            }
        }
        false
    }
}

impl WireCodec for SignatureMap {
    fn encode(&self, w: &mut WireWriter) {
        for entry in &self.entries {
            w.write_nested(1, |child| {
                child.write_bytes(1, entry.prefix());
                child.write_bytes(2, &entry.signature);
                child.write_varint(
                    3,
                    match entry.curve {
                        CurveKind::Ed25519 => 0,
                        CurveKind::EcdsaSecp256k1 => 1,
                    },
                );
            });
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut map = SignatureMap::new();
        while let Some((field_number, wire_type)) = r.read_tag()? {
            if field_number != 1 {
                r.skip_field(wire_type)?;
                continue;
            }
            let bytes = r.read_bytes()?;
            let mut inner = WireReader::new(bytes);
            let mut prefix = Vec::new();
            let mut signature = Vec::new();
            let mut curve = CurveKind::Ed25519;
            while let Some((f, wt)) = inner.read_tag()? {
                match f {
                    1 => prefix = inner.read_bytes()?.to_vec(),
                    2 => signature = inner.read_bytes()?.to_vec(),
                    3 => {
                        curve = match inner.read_varint()? {
                            0 => CurveKind::Ed25519,
                            1 => CurveKind::EcdsaSecp256k1,
                            _ => return Err(DecodeError::Malformed("unknown curve kind tag")),
                        }
                    }
                    _ => inner.skip_field(wt)?,
                }
            }
            let prefix_len = prefix.len();
            map.entries.push(SignatureEntry {
                full_public_key: prefix,
                prefix_len,
                signature,
                curve,
            });
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_discipline_extends_on_collision() {
        let mut map = SignatureMap::new();
        map.insert(vec![0xAA, 0x01], CurveKind::Ed25519, vec![1]);
        assert_eq!(map.entries()[0].prefix_len, 1);

        map.insert(vec![0xAA, 0x02], CurveKind::Ed25519, vec![2]);
        // Both keys now share a leading 0xAA byte; the first entry's
        // stored prefix must be retroactively extended.
        assert_eq!(map.entries()[0].prefix_len, 2);
        assert_eq!(map.entries()[1].prefix_len, 2);
    }

    #[test]
    fn shortest_unique_prefix_is_one_byte_when_distinct() {
        let mut map = SignatureMap::new();
        map.insert(vec![0x11, 0x00], CurveKind::Ed25519, vec![]);
        map.insert(vec![0x22, 0x00], CurveKind::Ed25519, vec![]);
        for entry in map.entries() {
            assert_eq!(entry.prefix_len, 1);
        }
    }

    #[test]
    fn wire_round_trip_preserves_prefix_and_signature() {
        let mut map = SignatureMap::new();
        map.insert(vec![1, 2, 3, 4], CurveKind::EcdsaSecp256k1, vec![9, 9, 9]);
        let bytes = map.encode_to_vec();
        let decoded = SignatureMap::decode_from_slice(&bytes).unwrap();
        assert_eq!(decoded.entries().len(), 1);
        assert_eq!(decoded.entries()[0].signature, vec![9, 9, 9]);
        assert_eq!(decoded.entries()[0].curve, CurveKind::EcdsaSecp256k1);
    }
}
