//! Top-level error taxonomy (§7): one `thiserror`-derived enum in the style
//! of the teacher's hand-written `VAppEngineError<E>`, generalized from a
//! manual `Display`/`From` impl block to a derive since `thiserror` is the
//! ecosystem's idiomatic replacement for that pattern.

use hashgraph_common::EntityId;

use crate::response::PrecheckStatus;
use crate::transaction::TransactionId;

/// Every error surfaced by this crate carries the remote node and
/// transaction id context named in §7, where one was known at the point
/// of failure.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(&'static str),

    #[error("unsupported configuration option: {0}")]
    UnsupportedConfigOption(String),

    #[error("setter called on an already-frozen transaction")]
    FrozenMutation,

    #[error("node {node} rejected the submission at precheck: {status:?}")]
    Precheck {
        status: PrecheckStatus,
        node: EntityId,
        transaction_id: Option<TransactionId>,
    },

    #[error("transaction {transaction_id} reached consensus with a non-success status: {status:?}")]
    Consensus {
        status: crate::receipt::ConsensusStatus,
        transaction_id: TransactionId,
    },

    #[error("transport error talking to node {node}: {source}")]
    Transport {
        #[source]
        source: crate::transport::TransportError,
        node: EntityId,
    },

    #[error("deadline reached before a terminal outcome for transaction {transaction_id:?}")]
    Timeout { transaction_id: Option<TransactionId> },

    #[error("exhausted {attempts} attempts before a terminal outcome for transaction {transaction_id:?}")]
    MaxAttemptsExceeded {
        attempts: u32,
        transaction_id: Option<TransactionId>,
    },

    #[error("decode error: {0}")]
    Decode(#[from] hashgraph_common::DecodeError),

    #[error("crypto error: {0}")]
    Crypto(#[from] hashgraph_crypto::CryptoError),
}
