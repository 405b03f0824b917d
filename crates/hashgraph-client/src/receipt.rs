//! Receipt/record pump (C10): polls a submitted transaction's node for a
//! terminal receipt, on the quick-then-slow cadence in §4.7.

use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use hashgraph_common::wire::{WireCodec, WireReader, WireWriter};
use hashgraph_common::{DecodeError, EntityId};

use crate::error::ClientError;
use crate::transaction::TransactionId;
use crate::transport::TransportError;

/// A transaction's consensus outcome. `Unknown` means the node has not yet
/// reached consensus on it; every other variant is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusStatus {
    Unknown,
    Success,
    ReceiptNotFound,
    Failed(u32),
}

impl ConsensusStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ConsensusStatus::Unknown)
    }

    fn to_wire(self) -> u32 {
        match self {
            ConsensusStatus::Unknown => 0,
            ConsensusStatus::Success => 1,
            ConsensusStatus::ReceiptNotFound => 2,
            ConsensusStatus::Failed(code) => code,
        }
    }

    fn from_wire(code: u32) -> Self {
        match code {
            0 => ConsensusStatus::Unknown,
            1 => ConsensusStatus::Success,
            2 => ConsensusStatus::ReceiptNotFound,
            other => ConsensusStatus::Failed(other),
        }
    }
}

/// The outcome of a receipt poll: the consensus status plus, for a
/// creation transaction, the id of the entity it created (populated only
/// on `Success`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub status: ConsensusStatus,
    pub created_entity_id: Option<EntityId>,
}

const TAG_RECEIPT_STATUS: u32 = 1;
const TAG_RECEIPT_CREATED: u32 = 2;

impl WireCodec for Receipt {
    fn encode(&self, w: &mut WireWriter) {
        w.write_varint(TAG_RECEIPT_STATUS, self.status.to_wire() as u64);
        if let Some(id) = &self.created_entity_id {
            w.write_nested(TAG_RECEIPT_CREATED, |c| id.encode(c));
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut status = ConsensusStatus::Unknown;
        let mut created_entity_id = None;
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                TAG_RECEIPT_STATUS => status = ConsensusStatus::from_wire(r.read_varint()? as u32),
                TAG_RECEIPT_CREATED => created_entity_id = Some(EntityId::decode_from_slice(r.read_bytes()?)?),
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(Receipt {
            status,
            created_entity_id,
        })
    }
}

/// A full record: the receipt plus whatever child records the transaction
/// spawned (e.g. a hollow-account auto-creation triggered by a transfer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub receipt: Receipt,
    pub child_receipts: Vec<Receipt>,
}

const TAG_RECORD_RECEIPT: u32 = 1;
const TAG_RECORD_CHILD: u32 = 2;

impl WireCodec for Record {
    fn encode(&self, w: &mut WireWriter) {
        w.write_nested(TAG_RECORD_RECEIPT, |c| self.receipt.encode(c));
        for child in &self.child_receipts {
            w.write_nested(TAG_RECORD_CHILD, |c| child.encode(c));
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut receipt = None;
        let mut child_receipts = Vec::new();
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                TAG_RECORD_RECEIPT => receipt = Some(Receipt::decode_from_slice(r.read_bytes()?)?),
                TAG_RECORD_CHILD => child_receipts.push(Receipt::decode_from_slice(r.read_bytes()?)?),
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(Record {
            receipt: receipt.ok_or(DecodeError::Malformed("record missing its receipt"))?,
            child_receipts,
        })
    }
}

/// Abstracts "ask this node for the receipt of this transaction id" so the
/// pump can be driven by a scripted sequence in tests, and in production
/// by a real node query sent over a [`crate::transport::Transport`].
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    async fn poll_receipt(&self, transaction_id: &TransactionId) -> Result<Receipt, TransportError>;

    /// Fetches the full record (`RECORD` rather than `RECEIPT`), including
    /// any child receipts spawned by the transaction — e.g. the hollow
    /// account a transfer auto-creates for a bare external-chain address
    /// alias (§4.7). Sources that don't distinguish the two calls can rely
    /// on this default, which reports no child receipts.
    async fn poll_record(&self, transaction_id: &TransactionId) -> Result<Record, TransportError> {
        Ok(Record {
            receipt: self.poll_receipt(transaction_id).await?,
            child_receipts: Vec::new(),
        })
    }
}

/// Quick-then-slow poll cadence: five probes at `quick_interval`, then
/// `slow_interval` thereafter, bounded by `deadline`. Mirrors the shape of
/// the teacher's attempt loop backoff rather than a fixed-interval poll,
/// since consensus is usually fast but occasionally is not.
pub struct ReceiptPump<R: ReceiptSource> {
    source: R,
    quick_interval: StdDuration,
    quick_probes: u32,
    slow_interval: StdDuration,
}

impl<R: ReceiptSource> ReceiptPump<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            quick_interval: StdDuration::from_millis(250),
            quick_probes: 5,
            slow_interval: StdDuration::from_secs(2),
        }
    }

    pub fn with_cadence(mut self, quick_interval: StdDuration, quick_probes: u32, slow_interval: StdDuration) -> Self {
        self.quick_interval = quick_interval;
        self.quick_probes = quick_probes;
        self.slow_interval = slow_interval;
        self
    }

    /// Polls until a terminal receipt is observed or `deadline` passes. A
    /// `ReceiptNotFound` response is treated as "not yet visible", not an
    /// error, and keeps polling — the submitting node may not have gossiped
    /// the transaction to the querying node yet.
    pub async fn await_receipt(
        &self,
        transaction_id: &TransactionId,
        deadline: StdDuration,
    ) -> Result<Receipt, ClientError> {
        let started_at = Instant::now();
        let deadline_at = started_at + deadline;
        let mut probe = 0u32;
        loop {
            let receipt = self
                .source
                .poll_receipt(transaction_id)
                .await
                .map_err(|source| ClientError::Transport {
                    source,
                    node: transaction_id.payer_account_id.clone(),
                })?;

            if receipt.status.is_terminal() && receipt.status != ConsensusStatus::ReceiptNotFound {
                return Ok(receipt);
            }

            let now = Instant::now();
            if now >= deadline_at {
                return Err(ClientError::Timeout {
                    transaction_id: Some(transaction_id.clone()),
                });
            }

            let wait = if probe < self.quick_probes {
                self.quick_interval
            } else {
                self.slow_interval
            };
            tokio::time::sleep(wait.min(deadline_at.saturating_duration_since(now))).await;
            probe += 1;
        }
    }

    /// Same cadence as [`Self::await_receipt`], but polls `RECORD` instead
    /// of `RECEIPT` so hollow-account-creation child receipts come back
    /// with the result. Used when the submitted transaction was a transfer
    /// that may have auto-created an account for a bare external-chain
    /// address alias.
    pub async fn await_record(&self, transaction_id: &TransactionId, deadline: StdDuration) -> Result<Record, ClientError> {
        let started_at = Instant::now();
        let deadline_at = started_at + deadline;
        let mut probe = 0u32;
        loop {
            let record = self
                .source
                .poll_record(transaction_id)
                .await
                .map_err(|source| ClientError::Transport {
                    source,
                    node: transaction_id.payer_account_id.clone(),
                })?;

            if record.receipt.status.is_terminal() && record.receipt.status != ConsensusStatus::ReceiptNotFound {
                return Ok(record);
            }

            let now = Instant::now();
            if now >= deadline_at {
                return Err(ClientError::Timeout {
                    transaction_id: Some(transaction_id.clone()),
                });
            }

            let wait = if probe < self.quick_probes {
                self.quick_interval
            } else {
                self.slow_interval
            };
            tokio::time::sleep(wait.min(deadline_at.saturating_duration_since(now))).await;
            probe += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashgraph_common::Timestamp;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedSource<F>(F)
    where
        F: Fn(u32) -> Result<Receipt, TransportError> + Send + Sync;

    #[async_trait]
    impl<F> ReceiptSource for ScriptedSource<F>
    where
        F: Fn(u32) -> Result<Receipt, TransportError> + Send + Sync,
    {
        async fn poll_receipt(&self, _transaction_id: &TransactionId) -> Result<Receipt, TransportError> {
            (self.0)(0)
        }
    }

    fn tx_id() -> TransactionId {
        TransactionId::generate(EntityId::new(0, 0, 2), Timestamp::new(1_700_000_000, 0))
    }

    #[tokio::test]
    async fn unknown_then_success_resolves() {
        let calls = AtomicU32::new(0);
        let source = ScriptedSource(move |_| {
            let n = calls.fetch_add(1, Ordering::Relaxed);
            if n < 2 {
                Ok(Receipt {
                    status: ConsensusStatus::Unknown,
                    created_entity_id: None,
                })
            } else {
                Ok(Receipt {
                    status: ConsensusStatus::Success,
                    created_entity_id: Some(EntityId::new(0, 0, 777)),
                })
            }
        });
        let pump = ReceiptPump::new(source).with_cadence(StdDuration::from_millis(1), 10, StdDuration::from_millis(1));
        let receipt = pump.await_receipt(&tx_id(), StdDuration::from_secs(1)).await.unwrap();
        assert_eq!(receipt.status, ConsensusStatus::Success);
        assert_eq!(receipt.created_entity_id, Some(EntityId::new(0, 0, 777)));
    }

    #[tokio::test]
    async fn failure_status_is_terminal() {
        let source = ScriptedSource(|_| {
            Ok(Receipt {
                status: ConsensusStatus::Failed(42),
                created_entity_id: None,
            })
        });
        let pump = ReceiptPump::new(source);
        let receipt = pump.await_receipt(&tx_id(), StdDuration::from_secs(1)).await.unwrap();
        assert_eq!(receipt.status, ConsensusStatus::Failed(42));
    }

    #[tokio::test]
    async fn deadline_exceeded_while_still_unknown() {
        let source = ScriptedSource(|_| {
            Ok(Receipt {
                status: ConsensusStatus::Unknown,
                created_entity_id: None,
            })
        });
        let pump = ReceiptPump::new(source).with_cadence(StdDuration::from_millis(1), 1, StdDuration::from_millis(1));
        let err = pump
            .await_receipt(&tx_id(), StdDuration::from_millis(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));
    }

    #[test]
    fn receipt_wire_round_trip() {
        let receipt = Receipt {
            status: ConsensusStatus::Success,
            created_entity_id: Some(EntityId::new(0, 0, 9)),
        };
        let bytes = receipt.encode_to_vec();
        assert_eq!(Receipt::decode_from_slice(&bytes).unwrap(), receipt);
    }

    #[test]
    fn record_wire_round_trip_carries_child_receipts() {
        let record = Record {
            receipt: Receipt {
                status: ConsensusStatus::Success,
                created_entity_id: None,
            },
            child_receipts: vec![Receipt {
                status: ConsensusStatus::Success,
                created_entity_id: Some(EntityId::new(0, 0, 1001)),
            }],
        };
        let bytes = record.encode_to_vec();
        assert_eq!(Record::decode_from_slice(&bytes).unwrap(), record);
    }

    /// A transfer to a bare external-chain address alias auto-creates a
    /// hollow account; its `RECORD` carries that creation as a child
    /// receipt even though the parent transfer created nothing itself.
    struct HollowAccountSource;

    #[async_trait]
    impl ReceiptSource for HollowAccountSource {
        async fn poll_receipt(&self, _transaction_id: &TransactionId) -> Result<Receipt, TransportError> {
            Ok(Receipt {
                status: ConsensusStatus::Success,
                created_entity_id: None,
            })
        }

        async fn poll_record(&self, transaction_id: &TransactionId) -> Result<Record, TransportError> {
            let receipt = self.poll_receipt(transaction_id).await?;
            Ok(Record {
                receipt,
                child_receipts: vec![Receipt {
                    status: ConsensusStatus::Success,
                    created_entity_id: Some(EntityId::new(0, 0, 5005)),
                }],
            })
        }
    }

    #[tokio::test]
    async fn await_record_surfaces_hollow_account_child_receipt() {
        let pump = ReceiptPump::new(HollowAccountSource);
        let record = pump.await_record(&tx_id(), StdDuration::from_secs(1)).await.unwrap();
        assert_eq!(record.receipt.status, ConsensusStatus::Success);
        assert_eq!(record.child_receipts.len(), 1);
        assert_eq!(record.child_receipts[0].created_entity_id, Some(EntityId::new(0, 0, 5005)));
    }
}
