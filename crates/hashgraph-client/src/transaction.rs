//! Transaction/query body (C6) and signed envelope (C7): the canonical,
//! deterministically-serialized body whose bytes are the signing digest
//! input, plus the builder-with-freeze state machine that turns a mutable
//! draft into one body-bytes-and-signature-map variant per candidate node.

use std::fmt;

use hashgraph_common::wire::{WireCodec, WireReader, WireWriter};
use hashgraph_common::{DecodeError, Duration, EntityId, Timestamp};
use hashgraph_crypto::{CurveKind, Key, Signer, SignatureMap};

use crate::error::ClientError;

/// Jitter subtracted from "now" when minting a valid-start, so that minor
/// clock skew with the receiving node does not push the timestamp into the
/// future and trip the valid-window check on arrival.
const VALID_START_JITTER_NANOS: u32 = 0;

/// Default transaction-valid-duration window, matching the well-known
/// network default (120 seconds).
pub const DEFAULT_VALID_DURATION_SECS: i64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId {
    pub payer_account_id: EntityId,
    pub valid_start: Timestamp,
    pub scheduled: bool,
    pub nonce: Option<i32>,
}

impl TransactionId {
    /// Mints `(payer, now - jitter)`; two ids are equal iff every field
    /// matches, so the jitter is fixed per construction rather than
    /// resampled on every comparison.
    pub fn generate(payer_account_id: EntityId, now: Timestamp) -> Self {
        Self {
            payer_account_id,
            valid_start: now.minus_nanos(VALID_START_JITTER_NANOS),
            scheduled: false,
            nonce: None,
        }
    }

    pub fn with_nonce(mut self, nonce: i32) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}.{}",
            self.payer_account_id, self.valid_start.seconds, self.valid_start.nanos
        )?;
        if let Some(nonce) = self.nonce {
            write!(f, "/{nonce}")?;
        }
        Ok(())
    }
}

const TAG_ID_PAYER: u32 = 1;
const TAG_ID_VALID_START: u32 = 2;
const TAG_ID_SCHEDULED: u32 = 3;
const TAG_ID_NONCE: u32 = 4;

impl WireCodec for TransactionId {
    fn encode(&self, w: &mut WireWriter) {
        w.write_nested(TAG_ID_PAYER, |c| self.payer_account_id.encode(c));
        w.write_nested(TAG_ID_VALID_START, |c| self.valid_start.encode(c));
        w.write_bool(TAG_ID_SCHEDULED, self.scheduled);
        if let Some(nonce) = self.nonce {
            w.write_sint(TAG_ID_NONCE, nonce as i64);
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut payer_account_id = EntityId::new(0, 0, 0);
        let mut valid_start = Timestamp::default();
        let mut scheduled = false;
        let mut nonce = None;
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                TAG_ID_PAYER => payer_account_id = EntityId::decode_from_slice(r.read_bytes()?)?,
                TAG_ID_VALID_START => valid_start = Timestamp::decode_from_slice(r.read_bytes()?)?,
                TAG_ID_SCHEDULED => scheduled = r.read_varint()? != 0,
                TAG_ID_NONCE => nonce = Some(r.read_sint()? as i32),
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(TransactionId {
            payer_account_id,
            valid_start,
            scheduled,
            nonce,
        })
    }
}

/// The tagged union of domain operations this body can carry. Scoped to
/// the minimal real subset needed to exercise every core invariant and
/// end-to-end scenario named in the spec; the exhaustive per-operation
/// builders are an explicit non-goal (see the design ledger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionData {
    CryptoTransfer { transfers: Vec<(EntityId, i64)> },
    FileCreate { contents: Vec<u8> },
    FileAppend { file_id: EntityId, contents: Vec<u8> },
    ContractCreate { bytecode_file_id: EntityId, gas: u64, initial_balance: u64 },
    TokenReject { owner: EntityId, fungible_token_ids: Vec<EntityId>, nft_token_ids: Vec<EntityId> },
    TokenDissociate { account_id: EntityId, token_ids: Vec<EntityId> },
}

const TAG_DATA_CRYPTO_TRANSFER: u32 = 10;
const TAG_DATA_FILE_CREATE: u32 = 11;
const TAG_DATA_FILE_APPEND: u32 = 12;
const TAG_DATA_CONTRACT_CREATE: u32 = 13;
const TAG_DATA_TOKEN_REJECT: u32 = 14;
const TAG_DATA_TOKEN_DISSOCIATE: u32 = 15;

impl TransactionData {
    fn encode(&self, w: &mut WireWriter) {
        match self {
            TransactionData::CryptoTransfer { transfers } => {
                w.write_nested(TAG_DATA_CRYPTO_TRANSFER, |c| {
                    for (account, amount) in transfers {
                        c.write_nested(1, |entry| {
                            entry.write_nested(1, |a| account.encode(a));
                            entry.write_sint(2, *amount);
                        });
                    }
                });
            }
            TransactionData::FileCreate { contents } => {
                w.write_nested(TAG_DATA_FILE_CREATE, |c| c.write_bytes(1, contents));
            }
            TransactionData::FileAppend { file_id, contents } => {
                w.write_nested(TAG_DATA_FILE_APPEND, |c| {
                    c.write_nested(1, |f| file_id.encode(f));
                    c.write_bytes(2, contents);
                });
            }
            TransactionData::ContractCreate {
                bytecode_file_id,
                gas,
                initial_balance,
            } => {
                w.write_nested(TAG_DATA_CONTRACT_CREATE, |c| {
                    c.write_nested(1, |f| bytecode_file_id.encode(f));
                    c.write_varint(2, *gas);
                    c.write_varint(3, *initial_balance);
                });
            }
            TransactionData::TokenReject {
                owner,
                fungible_token_ids,
                nft_token_ids,
            } => {
                w.write_nested(TAG_DATA_TOKEN_REJECT, |c| {
                    c.write_nested(1, |o| owner.encode(o));
                    for id in fungible_token_ids {
                        c.write_nested(2, |i| id.encode(i));
                    }
                    for id in nft_token_ids {
                        c.write_nested(3, |i| id.encode(i));
                    }
                });
            }
            TransactionData::TokenDissociate { account_id, token_ids } => {
                w.write_nested(TAG_DATA_TOKEN_DISSOCIATE, |c| {
                    c.write_nested(1, |a| account_id.encode(a));
                    for id in token_ids {
                        c.write_nested(2, |i| id.encode(i));
                    }
                });
            }
        }
    }

    fn decode(field_number: u32, bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = WireReader::new(bytes);
        match field_number {
            TAG_DATA_CRYPTO_TRANSFER => {
                let mut transfers = Vec::new();
                while let Some((f, wt)) = r.read_tag()? {
                    if f != 1 {
                        r.skip_field(wt)?;
                        continue;
                    }
                    let mut entry_r = WireReader::new(r.read_bytes()?);
                    let mut account = EntityId::new(0, 0, 0);
                    let mut amount = 0i64;
                    while let Some((ef, ewt)) = entry_r.read_tag()? {
                        match ef {
                            1 => account = EntityId::decode_from_slice(entry_r.read_bytes()?)?,
                            2 => amount = entry_r.read_sint()?,
                            _ => entry_r.skip_field(ewt)?,
                        }
                    }
                    transfers.push((account, amount));
                }
                Ok(TransactionData::CryptoTransfer { transfers })
            }
            TAG_DATA_FILE_CREATE => {
                let mut contents = Vec::new();
                while let Some((f, wt)) = r.read_tag()? {
                    if f == 1 {
                        contents = r.read_bytes()?.to_vec();
                    } else {
                        r.skip_field(wt)?;
                    }
                }
                Ok(TransactionData::FileCreate { contents })
            }
            TAG_DATA_FILE_APPEND => {
                let mut file_id = EntityId::new(0, 0, 0);
                let mut contents = Vec::new();
                while let Some((f, wt)) = r.read_tag()? {
                    match f {
                        1 => file_id = EntityId::decode_from_slice(r.read_bytes()?)?,
                        2 => contents = r.read_bytes()?.to_vec(),
                        _ => r.skip_field(wt)?,
                    }
                }
                Ok(TransactionData::FileAppend { file_id, contents })
            }
            TAG_DATA_CONTRACT_CREATE => {
                let mut bytecode_file_id = EntityId::new(0, 0, 0);
                let mut gas = 0u64;
                let mut initial_balance = 0u64;
                while let Some((f, wt)) = r.read_tag()? {
                    match f {
                        1 => bytecode_file_id = EntityId::decode_from_slice(r.read_bytes()?)?,
                        2 => gas = r.read_varint()?,
                        3 => initial_balance = r.read_varint()?,
                        _ => r.skip_field(wt)?,
                    }
                }
                Ok(TransactionData::ContractCreate {
                    bytecode_file_id,
                    gas,
                    initial_balance,
                })
            }
            TAG_DATA_TOKEN_REJECT => {
                let mut owner = EntityId::new(0, 0, 0);
                let mut fungible_token_ids = Vec::new();
                let mut nft_token_ids = Vec::new();
                while let Some((f, wt)) = r.read_tag()? {
                    match f {
                        1 => owner = EntityId::decode_from_slice(r.read_bytes()?)?,
                        2 => fungible_token_ids.push(EntityId::decode_from_slice(r.read_bytes()?)?),
                        3 => nft_token_ids.push(EntityId::decode_from_slice(r.read_bytes()?)?),
                        _ => r.skip_field(wt)?,
                    }
                }
                Ok(TransactionData::TokenReject {
                    owner,
                    fungible_token_ids,
                    nft_token_ids,
                })
            }
            TAG_DATA_TOKEN_DISSOCIATE => {
                let mut account_id = EntityId::new(0, 0, 0);
                let mut token_ids = Vec::new();
                while let Some((f, wt)) = r.read_tag()? {
                    match f {
                        1 => account_id = EntityId::decode_from_slice(r.read_bytes()?)?,
                        2 => token_ids.push(EntityId::decode_from_slice(r.read_bytes()?)?),
                        _ => r.skip_field(wt)?,
                    }
                }
                Ok(TransactionData::TokenDissociate { account_id, token_ids })
            }
            _ => Err(DecodeError::Malformed("unrecognized transaction data tag")),
        }
    }
}

/// The canonical body: id, node target, fee ceiling, valid-duration, memo,
/// and the payload. Field order is fixed by tag number, so two bodies with
/// identical content always serialize identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBody {
    pub transaction_id: TransactionId,
    pub node_account_id: EntityId,
    pub transaction_fee: u64,
    pub transaction_valid_duration: Duration,
    pub memo: String,
    pub data: TransactionData,
}

const TAG_BODY_ID: u32 = 1;
const TAG_BODY_NODE: u32 = 2;
const TAG_BODY_FEE: u32 = 3;
const TAG_BODY_VALID_DURATION: u32 = 4;
const TAG_BODY_MEMO: u32 = 5;

impl WireCodec for TransactionBody {
    fn encode(&self, w: &mut WireWriter) {
        w.write_nested(TAG_BODY_ID, |c| self.transaction_id.encode(c));
        w.write_nested(TAG_BODY_NODE, |c| self.node_account_id.encode(c));
        w.write_varint(TAG_BODY_FEE, self.transaction_fee);
        w.write_nested(TAG_BODY_VALID_DURATION, |c| self.transaction_valid_duration.encode(c));
        w.write_string(TAG_BODY_MEMO, &self.memo);
        self.data.encode(w);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut transaction_id = None;
        let mut node_account_id = EntityId::new(0, 0, 0);
        let mut transaction_fee = 0u64;
        let mut transaction_valid_duration = Duration::default();
        let mut memo = String::new();
        let mut data = None;
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                TAG_BODY_ID => transaction_id = Some(TransactionId::decode_from_slice(r.read_bytes()?)?),
                TAG_BODY_NODE => node_account_id = EntityId::decode_from_slice(r.read_bytes()?)?,
                TAG_BODY_FEE => transaction_fee = r.read_varint()?,
                TAG_BODY_VALID_DURATION => {
                    transaction_valid_duration = Duration::decode_from_slice(r.read_bytes()?)?
                }
                TAG_BODY_MEMO => memo = r.read_string()?,
                f if f >= TAG_DATA_CRYPTO_TRANSFER => {
                    data = Some(TransactionData::decode(f, r.read_bytes()?)?);
                }
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(TransactionBody {
            transaction_id: transaction_id.ok_or(DecodeError::Malformed("missing transaction id"))?,
            node_account_id,
            transaction_fee,
            transaction_valid_duration,
            memo,
            data: data.ok_or(DecodeError::Malformed("missing transaction data"))?,
        })
    }
}

/// `{body_bytes, signature_map}` — the unit transmitted on the wire.
/// Nodes hash `body_bytes` and verify signatures against exactly those
/// bytes, never against the `TransactionBody` struct directly.
#[derive(Debug, Clone)]
pub struct SignedTransactionEnvelope {
    pub body_bytes: Vec<u8>,
    pub signature_map: SignatureMap,
}

impl WireCodec for SignedTransactionEnvelope {
    fn encode(&self, w: &mut WireWriter) {
        w.write_bytes(1, &self.body_bytes);
        w.write_nested(2, |c| self.signature_map.encode(c));
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut body_bytes = Vec::new();
        let mut signature_map = SignatureMap::new();
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                1 => body_bytes = r.read_bytes()?.to_vec(),
                2 => signature_map = SignatureMap::decode_from_slice(r.read_bytes()?)?,
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(SignedTransactionEnvelope {
            body_bytes,
            signature_map,
        })
    }
}

/// One node's materialized `(body_bytes, signature_map)` pair. The engine
/// pre-computes one of these per candidate node so that at send time it
/// only needs to pick the variant matching the chosen node, rather than
/// re-serializing or re-signing on the hot path.
#[derive(Debug, Clone)]
pub struct NodeVariant {
    pub node_account_id: EntityId,
    pub body_bytes: Vec<u8>,
    pub signature_map: SignatureMap,
}

#[derive(Debug, Clone)]
pub struct FrozenTransaction {
    pub transaction_id: TransactionId,
    pub variants: Vec<NodeVariant>,
}

/// A transaction builder: mutable until frozen, after which every setter
/// is rejected with [`ClientError::FrozenMutation`].
#[derive(Debug, Clone)]
pub struct Transaction {
    data: TransactionData,
    memo: String,
    transaction_fee: u64,
    transaction_valid_duration: Duration,
    forced_valid_start: Option<Timestamp>,
    nonce: Option<i32>,
    candidate_nodes: Vec<EntityId>,
    frozen: Option<FrozenTransaction>,
}

impl Transaction {
    pub fn new(data: TransactionData) -> Self {
        Self {
            data,
            memo: String::new(),
            transaction_fee: 0,
            transaction_valid_duration: Duration::from_secs(DEFAULT_VALID_DURATION_SECS),
            forced_valid_start: None,
            nonce: None,
            candidate_nodes: Vec::new(),
            frozen: None,
        }
    }

    fn require_mutable(&self) -> Result<(), ClientError> {
        if self.frozen.is_some() {
            return Err(ClientError::FrozenMutation);
        }
        Ok(())
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> Result<(), ClientError> {
        self.require_mutable()?;
        self.memo = memo.into();
        Ok(())
    }

    pub fn set_max_transaction_fee(&mut self, tinybars: u64) -> Result<(), ClientError> {
        self.require_mutable()?;
        self.transaction_fee = tinybars;
        Ok(())
    }

    pub fn set_transaction_valid_duration(&mut self, duration: Duration) -> Result<(), ClientError> {
        self.require_mutable()?;
        self.transaction_valid_duration = duration;
        Ok(())
    }

    /// Pins the valid-start rather than letting freeze mint one from the
    /// clock; used by multi-tx flows (C11) so every chunk in a batch
    /// shares one valid-start transaction id.
    pub fn force_valid_start(&mut self, valid_start: Timestamp) -> Result<(), ClientError> {
        self.require_mutable()?;
        self.forced_valid_start = Some(valid_start);
        Ok(())
    }

    pub fn set_nonce(&mut self, nonce: i32) -> Result<(), ClientError> {
        self.require_mutable()?;
        self.nonce = Some(nonce);
        Ok(())
    }

    pub fn data(&self) -> &TransactionData {
        &self.data
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        self.frozen.as_ref().map(|f| &f.transaction_id)
    }

    pub fn variant_for(&self, node_account_id: &EntityId) -> Option<&NodeVariant> {
        self.frozen
            .as_ref()?
            .variants
            .iter()
            .find(|v| &v.node_account_id == node_account_id)
    }

    /// Captures transaction id, node targets, and fee ceiling, and
    /// materializes one body-bytes variant per candidate node. A no-op if
    /// already frozen (invariant: freeze is idempotent).
    pub fn freeze_with(
        &mut self,
        candidate_nodes: &[EntityId],
        payer_account_id: EntityId,
        now: Timestamp,
    ) -> Result<(), ClientError> {
        if self.frozen.is_some() {
            return Ok(());
        }
        if candidate_nodes.is_empty() {
            return Err(ClientError::Config("no candidate nodes to freeze against"));
        }
        if let TransactionData::CryptoTransfer { transfers } = &self.data {
            let net: i64 = transfers.iter().map(|(_, amount)| amount).sum();
            if net != 0 {
                return Err(ClientError::Config("hbar transfers must net to zero"));
            }
        }

        let mut transaction_id = TransactionId::generate(
            payer_account_id,
            self.forced_valid_start.unwrap_or(now),
        );
        if let Some(nonce) = self.nonce {
            transaction_id = transaction_id.with_nonce(nonce);
        }

        self.candidate_nodes = candidate_nodes.to_vec();
        let mut variants = Vec::with_capacity(candidate_nodes.len());
        for node_account_id in candidate_nodes {
            let body = TransactionBody {
                transaction_id: transaction_id.clone(),
                node_account_id: node_account_id.clone(),
                transaction_fee: self.transaction_fee,
                transaction_valid_duration: self.transaction_valid_duration,
                memo: self.memo.clone(),
                data: self.data.clone(),
            };
            variants.push(NodeVariant {
                node_account_id: node_account_id.clone(),
                body_bytes: body.encode_to_vec(),
                signature_map: SignatureMap::new(),
            });
        }
        self.frozen = Some(FrozenTransaction {
            transaction_id,
            variants,
        });
        Ok(())
    }

    /// Signs every node variant's body-bytes with `signer`, inserting (or
    /// replacing) that signer's entry in each variant's signature map.
    pub fn sign(&mut self, signer: &Signer) -> Result<(), ClientError> {
        let frozen = self
            .frozen
            .as_mut()
            .ok_or(ClientError::Config("cannot sign before freezing"))?;
        let (full_public_key, curve) = match signer.public_key() {
            Key::Ed25519(bytes) => (bytes.to_vec(), CurveKind::Ed25519),
            Key::EcdsaSecp256k1(bytes) => (bytes.to_vec(), CurveKind::EcdsaSecp256k1),
            _ => return Err(ClientError::Config("signer key must be a single-curve key")),
        };
        for variant in frozen.variants.iter_mut() {
            let signature = signer.sign(&variant.body_bytes);
            variant
                .signature_map
                .insert(full_public_key.clone(), curve, signature);
        }
        Ok(())
    }

    /// Mints a fresh transaction id (new valid-start, same payer) and
    /// re-freezes against the same candidate node set, clearing every
    /// variant's signature map so the caller must re-sign.
    pub fn refresh_id(&mut self, payer_account_id: EntityId, now: Timestamp) -> Result<(), ClientError> {
        let candidate_nodes = self.candidate_nodes.clone();
        self.forced_valid_start = None;
        self.frozen = None;
        self.freeze_with(&candidate_nodes, payer_account_id, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(num: u64) -> EntityId {
        EntityId::new(0, 0, num)
    }

    #[test]
    fn freeze_is_idempotent() {
        let mut tx = Transaction::new(TransactionData::CryptoTransfer {
            transfers: vec![(account(2), 5), (account(3), -5)],
        });
        let nodes = vec![account(3)];
        tx.freeze_with(&nodes, account(2), Timestamp::new(1_700_000_000, 0))
            .unwrap();
        let id_before = tx.transaction_id().cloned();
        tx.freeze_with(&nodes, account(2), Timestamp::new(1_800_000_000, 0))
            .unwrap();
        assert_eq!(tx.transaction_id().cloned(), id_before);
    }

    #[test]
    fn setter_after_freeze_is_rejected() {
        let mut tx = Transaction::new(TransactionData::FileAppend {
            file_id: account(100),
            contents: vec![1, 2, 3],
        });
        tx.freeze_with(&[account(3)], account(2), Timestamp::new(1_700_000_000, 0))
            .unwrap();
        assert!(matches!(tx.set_memo("late"), Err(ClientError::FrozenMutation)));
    }

    #[test]
    fn transfer_conservation_is_enforced_at_freeze() {
        let mut tx = Transaction::new(TransactionData::CryptoTransfer {
            transfers: vec![(account(2), 5), (account(3), -4)],
        });
        let err = tx
            .freeze_with(&[account(3)], account(2), Timestamp::new(1_700_000_000, 0))
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn s1_transfer_has_exactly_one_signature_entry() {
        let mut tx = Transaction::new(TransactionData::CryptoTransfer {
            transfers: vec![(account(2), 5), (account(3), -5)],
        });
        tx.freeze_with(&[account(3)], account(2), Timestamp::new(1_700_000_000, 0))
            .unwrap();
        let signer = Signer::from_ed25519_bytes(&[9u8; 32]);
        tx.sign(&signer).unwrap();
        let variant = tx.variant_for(&account(3)).unwrap();
        assert_eq!(variant.signature_map.len(), 1);
    }

    #[test]
    fn encoded_body_bytes_are_stable_across_runs() {
        let make = || {
            let mut tx = Transaction::new(TransactionData::CryptoTransfer {
                transfers: vec![(account(2), 5), (account(3), -5)],
            });
            tx.freeze_with(&[account(3)], account(2), Timestamp::new(1_700_000_000, 0))
                .unwrap();
            tx.variant_for(&account(3)).unwrap().body_bytes.clone()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn refresh_id_changes_valid_start_and_clears_signatures() {
        let mut tx = Transaction::new(TransactionData::FileAppend {
            file_id: account(100),
            contents: vec![1],
        });
        tx.freeze_with(&[account(3)], account(2), Timestamp::new(1_700_000_000, 0))
            .unwrap();
        let signer = Signer::from_ed25519_bytes(&[1u8; 32]);
        tx.sign(&signer).unwrap();
        let first_id = tx.transaction_id().cloned().unwrap();

        tx.refresh_id(account(2), Timestamp::new(1_700_000_500, 0)).unwrap();
        let second_id = tx.transaction_id().cloned().unwrap();
        assert_ne!(first_id.valid_start, second_id.valid_start);
        assert_eq!(tx.variant_for(&account(3)).unwrap().signature_map.len(), 0);
    }

    #[test]
    fn body_round_trips_through_wire_codec() {
        let body = TransactionBody {
            transaction_id: TransactionId::generate(account(2), Timestamp::new(1_700_000_000, 0)),
            node_account_id: account(3),
            transaction_fee: 100_000,
            transaction_valid_duration: Duration::from_secs(120),
            memo: "hello".into(),
            data: TransactionData::TokenDissociate {
                account_id: account(2),
                token_ids: vec![account(500), account(501)],
            },
        };
        let bytes = body.encode_to_vec();
        let decoded = TransactionBody::decode_from_slice(&bytes).unwrap();
        assert_eq!(decoded, body);
    }
}
