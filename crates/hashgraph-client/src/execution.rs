//! Execution engine (C9): the attempt loop that orchestrates node
//! selection, signing, send, response classification, and retry.

use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use hashgraph_common::{EntityId, Timestamp};
use hashgraph_crypto::Signer;

use crate::error::ClientError;
use crate::network::Network;
use crate::response::{classify, Classification, TransactionResponse};
use crate::transaction::Transaction;
use crate::transport::{Transport, TransportError};

/// Abstracts "send these bytes to node `index`" so the engine can be
/// exercised against scripted test doubles without a real socket, and in
/// production against lazily-connected per-node transports.
#[async_trait]
pub trait NodeSender: Send + Sync {
    async fn send(&self, node_index: usize, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// One transport per node, connected eagerly by the caller. The common
/// shape for tests that script per-node behavior (see `execution::tests`
/// and the S3 scenario).
pub struct FixedTransports(pub Vec<std::sync::Arc<dyn Transport>>);

#[async_trait]
impl NodeSender for FixedTransports {
    async fn send(&self, node_index: usize, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.0[node_index].exchange(payload).await
    }
}

/// Lets a `Client` share one `NodeSender` between its execution engine and
/// its receipt pump instead of standing up a second connection pool.
#[async_trait]
impl<T: NodeSender + ?Sized> NodeSender for std::sync::Arc<T> {
    async fn send(&self, node_index: usize, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).send(node_index, payload).await
    }
}

/// The outcome of a single `execute` call: the terminal response plus
/// which node it was obtained from, so the receipt pump (C10) knows where
/// to poll.
pub struct SubmitOutcome {
    pub response: TransactionResponse,
    pub node_account_id: EntityId,
}

pub struct ExecutionEngine<S: NodeSender> {
    network: std::sync::Arc<Network>,
    sender: S,
    max_attempts: u32,
    grpc_deadline: StdDuration,
    regenerate_tx_id: bool,
}

impl<S: NodeSender> ExecutionEngine<S> {
    pub fn new(
        network: std::sync::Arc<Network>,
        sender: S,
        max_attempts: u32,
        grpc_deadline: StdDuration,
        regenerate_tx_id: bool,
    ) -> Self {
        Self {
            network,
            sender,
            max_attempts,
            grpc_deadline,
            regenerate_tx_id,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Runs the attempt loop in §4.6. Freezes `transaction` against the
    /// full current address book if it isn't frozen yet, then repeats:
    /// pick a node, send, classify, and react, until a terminal class is
    /// reached or the attempt/deadline budget is exhausted.
    pub async fn execute(
        &self,
        transaction: &mut Transaction,
        signer: &Signer,
        payer_account_id: EntityId,
        now: impl Fn() -> Timestamp,
    ) -> Result<SubmitOutcome, ClientError> {
        let deadline = Instant::now() + self.grpc_deadline;

        if !transaction.is_frozen() {
            let candidate_nodes = self.all_node_ids().await;
            transaction.freeze_with(&candidate_nodes, payer_account_id.clone(), now())?;
            transaction.sign(signer)?;
        }

        let mut rng = rand::rng();
        let mut attempt = 0u32;
        loop {
            if attempt >= self.max_attempts {
                return Err(ClientError::MaxAttemptsExceeded {
                    attempts: attempt,
                    transaction_id: transaction.transaction_id().cloned(),
                });
            }
            let attempt_started_at = Instant::now();
            if attempt_started_at >= deadline {
                return Err(ClientError::Timeout {
                    transaction_id: transaction.transaction_id().cloned(),
                });
            }

            let node_index = self.network.pick(attempt_started_at, &mut rng).await;
            let node_account_id = self.network.node_account_id(node_index).await;
            let variant = transaction
                .variant_for(&node_account_id)
                .ok_or(ClientError::Config("node has no frozen body variant"))?;

            let envelope = crate::transaction::SignedTransactionEnvelope {
                body_bytes: variant.body_bytes.clone(),
                signature_map: variant.signature_map.clone(),
            };
            use hashgraph_common::wire::WireCodec;
            let payload = envelope.encode_to_vec();

            let remaining = deadline.saturating_duration_since(Instant::now());
            let send_result = tokio::time::timeout(remaining, self.sender.send(node_index, &payload)).await;

            let raw_response = match send_result {
                Err(_elapsed) => {
                    return Err(ClientError::Timeout {
                        transaction_id: transaction.transaction_id().cloned(),
                    });
                }
                Ok(Err(transport_error)) => {
                    self.network.mark_failure(node_index, Instant::now(), &mut rng).await;
                    tracing::warn!(node = %node_account_id, error = %transport_error, "transport error, retrying on another node");
                    attempt += 1;
                    continue;
                }
                Ok(Ok(bytes)) => bytes,
            };

            let response = TransactionResponse::decode_from_slice(&raw_response)?;
            match classify(&response, attempt, self.regenerate_tx_id) {
                Classification::OkTerminal => {
                    self.network.mark_success(node_index, Instant::now()).await;
                    return Ok(SubmitOutcome {
                        response,
                        node_account_id,
                    });
                }
                Classification::RetrySameNode => {
                    let wait = self.network.backoff_wait(node_index, Instant::now()).await;
                    tokio::time::sleep(wait.min(deadline.saturating_duration_since(Instant::now()))).await;
                    attempt += 1;
                }
                Classification::RetryOtherNode => {
                    self.network.mark_failure(node_index, Instant::now(), &mut rng).await;
                    attempt += 1;
                }
                Classification::RegenTxId => {
                    transaction.refresh_id(payer_account_id.clone(), now())?;
                    transaction.sign(signer)?;
                    attempt += 1;
                }
                Classification::ErrorTerminal => {
                    return Err(ClientError::Precheck {
                        status: response.precheck,
                        node: node_account_id,
                        transaction_id: transaction.transaction_id().cloned(),
                    });
                }
            }
        }
    }

    async fn all_node_ids(&self) -> Vec<EntityId> {
        let count = self.network.node_count().await;
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            ids.push(self.network.node_account_id(i).await);
        }
        ids
    }
}
