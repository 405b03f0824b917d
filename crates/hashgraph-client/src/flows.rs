//! Multi-tx flows (C11): higher-level operations built out of a strict
//! sequence of individually-frozen, individually-signed transactions.

use std::collections::HashSet;
use std::time::Duration as StdDuration;

use hashgraph_common::{EntityId, Timestamp};
use hashgraph_crypto::Signer;

use crate::error::ClientError;
use crate::execution::{ExecutionEngine, NodeSender, SubmitOutcome};
use crate::receipt::{ConsensusStatus, Receipt, ReceiptPump, ReceiptSource};
use crate::transaction::{Transaction, TransactionData};

/// Maximum bytes per `FileAppend` chunk (§4.8).
pub const MAX_APPEND_CHUNK_BYTES: usize = 4 * 1024;
/// Maximum bytes carried by the initial `FileCreate` window of a
/// large-bytecode contract-create flow (§4.8).
pub const MAX_FILE_CREATE_WINDOW_BYTES: usize = 2 * 1024;

fn split_into_chunks(payload: &[u8], chunk_size: usize) -> Vec<&[u8]> {
    if payload.is_empty() {
        return vec![&payload[0..0]];
    }
    payload.chunks(chunk_size).collect()
}

async fn submit_and_await<S: NodeSender, R: ReceiptSource>(
    engine: &ExecutionEngine<S>,
    pump: &ReceiptPump<R>,
    transaction: &mut Transaction,
    signer: &Signer,
    payer_account_id: EntityId,
    now: impl Fn() -> Timestamp + Copy,
    deadline: StdDuration,
) -> Result<(SubmitOutcome, Receipt), ClientError> {
    let outcome = engine.execute(transaction, signer, payer_account_id, now).await?;
    let transaction_id = transaction
        .transaction_id()
        .cloned()
        .expect("execute freezes the transaction before returning");
    let receipt = pump.await_receipt(&transaction_id, deadline).await?;
    if receipt.status != ConsensusStatus::Success {
        return Err(ClientError::Consensus {
            status: receipt.status,
            transaction_id,
        });
    }
    Ok((outcome, receipt))
}

/// Splits `contents` into ≤ [`MAX_APPEND_CHUNK_BYTES`] chunks and submits
/// one `FileAppend` per chunk, each carrying a sequential nonce on a
/// shared valid-start so every chunk belongs to the same transaction
/// family (invariant 12 / scenario S5). Aborts at the first failing chunk
/// without submitting the remainder.
pub async fn chunked_append<S: NodeSender, R: ReceiptSource>(
    engine: &ExecutionEngine<S>,
    pump: &ReceiptPump<R>,
    file_id: EntityId,
    contents: &[u8],
    signer: &Signer,
    payer_account_id: EntityId,
    now: impl Fn() -> Timestamp + Copy,
    deadline: StdDuration,
) -> Result<Vec<Receipt>, ClientError> {
    let chunks = split_into_chunks(contents, MAX_APPEND_CHUNK_BYTES);
    let shared_valid_start = now();
    let mut receipts = Vec::with_capacity(chunks.len());
    for (nonce, chunk) in chunks.into_iter().enumerate() {
        let mut tx = Transaction::new(TransactionData::FileAppend {
            file_id: file_id.clone(),
            contents: chunk.to_vec(),
        });
        tx.force_valid_start(shared_valid_start)?;
        tx.set_nonce(nonce as i32)?;
        let (_, receipt) = submit_and_await(
            engine,
            pump,
            &mut tx,
            signer,
            payer_account_id.clone(),
            now,
            deadline,
        )
        .await?;
        receipts.push(receipt);
    }
    Ok(receipts)
}

/// Creates a file with the first window of `bytecode`, appends the
/// remainder, then submits a contract-create referencing the file id.
/// Strictly ordered: each step's receipt must show success before the
/// flow proceeds to the next (§4.8).
pub async fn large_bytecode_contract_create<S: NodeSender, R: ReceiptSource>(
    engine: &ExecutionEngine<S>,
    pump: &ReceiptPump<R>,
    bytecode: &[u8],
    gas: u64,
    initial_balance: u64,
    signer: &Signer,
    payer_account_id: EntityId,
    now: impl Fn() -> Timestamp + Copy,
    deadline: StdDuration,
) -> Result<EntityId, ClientError> {
    let window = bytecode.len().min(MAX_FILE_CREATE_WINDOW_BYTES);
    let (first_window, remainder) = bytecode.split_at(window);

    let mut create_tx = Transaction::new(TransactionData::FileCreate {
        contents: first_window.to_vec(),
    });
    let (_, create_receipt) = submit_and_await(
        engine,
        pump,
        &mut create_tx,
        signer,
        payer_account_id.clone(),
        now,
        deadline,
    )
    .await?;
    let file_id = create_receipt
        .created_entity_id
        .ok_or(ClientError::Config("file create receipt carried no created id"))?;

    if !remainder.is_empty() {
        chunked_append(
            engine,
            pump,
            file_id.clone(),
            remainder,
            signer,
            payer_account_id.clone(),
            now,
            deadline,
        )
        .await?;
    }

    let mut contract_tx = Transaction::new(TransactionData::ContractCreate {
        bytecode_file_id: file_id,
        gas,
        initial_balance,
    });
    let (_, contract_receipt) = submit_and_await(
        engine,
        pump,
        &mut contract_tx,
        signer,
        payer_account_id,
        now,
        deadline,
    )
    .await?;
    contract_receipt
        .created_entity_id
        .ok_or(ClientError::Config("contract create receipt carried no created id"))
}

/// Submits a `TokenReject` over the caller-supplied fungible and NFT
/// token ids, then a `TokenDissociate` over their union (§4.8).
pub async fn token_reject_then_dissociate<S: NodeSender, R: ReceiptSource>(
    engine: &ExecutionEngine<S>,
    pump: &ReceiptPump<R>,
    owner: EntityId,
    fungible_token_ids: Vec<EntityId>,
    nft_token_ids: Vec<EntityId>,
    signer: &Signer,
    payer_account_id: EntityId,
    now: impl Fn() -> Timestamp + Copy,
    deadline: StdDuration,
) -> Result<(Receipt, Receipt), ClientError> {
    let mut seen: HashSet<EntityId> = HashSet::new();
    let mut token_ids: Vec<EntityId> = Vec::new();
    for id in fungible_token_ids.iter().chain(nft_token_ids.iter()) {
        if seen.insert(id.clone()) {
            token_ids.push(id.clone());
        }
    }

    let mut reject_tx = Transaction::new(TransactionData::TokenReject {
        owner: owner.clone(),
        fungible_token_ids,
        nft_token_ids,
    });
    let (_, reject_receipt) = submit_and_await(
        engine,
        pump,
        &mut reject_tx,
        signer,
        payer_account_id.clone(),
        now,
        deadline,
    )
    .await?;

    let mut dissociate_tx = Transaction::new(TransactionData::TokenDissociate {
        account_id: owner,
        token_ids,
    });
    let (_, dissociate_receipt) = submit_and_await(
        engine,
        pump,
        &mut dissociate_tx,
        signer,
        payer_account_id,
        now,
        deadline,
    )
    .await?;

    Ok((reject_receipt, dissociate_receipt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::FixedTransports;
    use crate::network::{Network, SelectionPolicy};
    use crate::node::NodeRecord;
    use crate::response::TransactionResponse;
    use crate::transport::testing::FixedTransport;
    use async_trait::async_trait;
    use hashgraph_common::wire::WireCodec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn clock() -> Timestamp {
        Timestamp::new(1_700_000_000, 0)
    }

    fn engine_with_ok_response() -> ExecutionEngine<FixedTransports> {
        let network = Arc::new(Network::new(
            vec![NodeRecord::new(EntityId::new(0, 0, 3), vec![], StdDuration::from_millis(250))],
            SelectionPolicy::RoundRobin,
            StdDuration::from_millis(1),
            StdDuration::from_secs(1),
        ));
        let ok = TransactionResponse::ok().encode_to_vec();
        let sender = FixedTransports(vec![Arc::new(FixedTransport::new(ok))]);
        ExecutionEngine::new(network, sender, 10, StdDuration::from_secs(5), true)
    }

    struct AlwaysSuccess {
        created: AtomicUsize,
    }

    #[async_trait]
    impl ReceiptSource for AlwaysSuccess {
        async fn poll_receipt(
            &self,
            _transaction_id: &crate::transaction::TransactionId,
        ) -> Result<Receipt, crate::transport::TransportError> {
            let next = self.created.fetch_add(1, Ordering::Relaxed) as u64;
            Ok(Receipt {
                status: ConsensusStatus::Success,
                created_entity_id: Some(EntityId::new(0, 0, 900 + next)),
            })
        }
    }

    #[tokio::test]
    async fn s5_9kib_append_splits_into_three_chunks_with_sequential_nonces() {
        let engine = engine_with_ok_response();
        let pump = ReceiptPump::new(AlwaysSuccess {
            created: AtomicUsize::new(0),
        })
        .with_cadence(StdDuration::from_millis(1), 0, StdDuration::from_millis(1));
        let signer = Signer::from_ed25519_bytes(&[7u8; 32]);
        let contents = vec![0xABu8; 9 * 1024];

        let receipts = chunked_append(
            &engine,
            &pump,
            EntityId::new(0, 0, 200),
            &contents,
            &signer,
            EntityId::new(0, 0, 2),
            clock,
            StdDuration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(receipts.len(), 3);
        assert!(receipts.iter().all(|r| r.status == ConsensusStatus::Success));
    }

    #[tokio::test]
    async fn large_bytecode_flow_creates_appends_then_creates_contract() {
        let engine = engine_with_ok_response();
        let pump = ReceiptPump::new(AlwaysSuccess {
            created: AtomicUsize::new(0),
        })
        .with_cadence(StdDuration::from_millis(1), 0, StdDuration::from_millis(1));
        let signer = Signer::from_ed25519_bytes(&[7u8; 32]);
        let bytecode = vec![0xCDu8; 5 * 1024];

        let contract_id = large_bytecode_contract_create(
            &engine,
            &pump,
            &bytecode,
            100_000,
            0,
            &signer,
            EntityId::new(0, 0, 2),
            clock,
            StdDuration::from_secs(5),
        )
        .await
        .unwrap();
        // file-create (id 900), one append chunk (id 901), then
        // contract-create (id 902) — three sequential receipt polls.
        assert_eq!(contract_id.num, 902);
    }

    #[tokio::test]
    async fn token_reject_then_dissociate_unions_token_ids() {
        let engine = engine_with_ok_response();
        let pump = ReceiptPump::new(AlwaysSuccess {
            created: AtomicUsize::new(0),
        })
        .with_cadence(StdDuration::from_millis(1), 0, StdDuration::from_millis(1));
        let signer = Signer::from_ed25519_bytes(&[7u8; 32]);

        let (reject_receipt, dissociate_receipt) = token_reject_then_dissociate(
            &engine,
            &pump,
            EntityId::new(0, 0, 2),
            vec![EntityId::new(0, 0, 50), EntityId::new(0, 0, 51)],
            vec![EntityId::new(0, 0, 51)],
            &signer,
            EntityId::new(0, 0, 2),
            clock,
            StdDuration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(reject_receipt.status, ConsensusStatus::Success);
        assert_eq!(dissociate_receipt.status, ConsensusStatus::Success);
    }
}
