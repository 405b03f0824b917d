//! Query envelope and cost-probe execution (C6, query half): queries share
//! the transaction envelope's wire shape but carry a header selecting
//! `ANSWER` vs `COST_ANSWER` instead of a signed body (§4.4).

use std::time::Instant;

use hashgraph_common::wire::{WireCodec, WireReader, WireWriter};
use hashgraph_common::{DecodeError, EntityId};

use crate::error::ClientError;
use crate::execution::{ExecutionEngine, NodeSender};
use crate::response::TransactionResponse;

/// Tinybar-denominated amount. 1 Hbar = 100,000,000 tinybars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hbar(i64);

impl Hbar {
    pub const TINYBARS_PER_HBAR: i64 = 100_000_000;

    pub fn from_tinybars(tinybars: i64) -> Self {
        Hbar(tinybars)
    }

    pub fn tinybars(self) -> i64 {
        self.0
    }

    pub fn as_hbar(self) -> f64 {
        self.0 as f64 / Self::TINYBARS_PER_HBAR as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Answer,
    CostAnswer,
}

impl ResponseType {
    fn to_wire(self) -> u32 {
        match self {
            ResponseType::Answer => 0,
            ResponseType::CostAnswer => 1,
        }
    }

    fn from_wire(code: u32) -> Self {
        match code {
            1 => ResponseType::CostAnswer,
            _ => ResponseType::Answer,
        }
    }
}

/// The shared query header: response-type selector plus an optional
/// pre-signed payment transaction's body bytes, carried opaquely since
/// building that payment is itself an ordinary [`crate::transaction::Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryHeader {
    pub response_type: ResponseType,
    pub payment_envelope_bytes: Option<Vec<u8>>,
}

const TAG_HEADER_RESPONSE_TYPE: u32 = 1;
const TAG_HEADER_PAYMENT: u32 = 2;

impl WireCodec for QueryHeader {
    fn encode(&self, w: &mut WireWriter) {
        w.write_varint(TAG_HEADER_RESPONSE_TYPE, self.response_type.to_wire() as u64);
        if let Some(bytes) = &self.payment_envelope_bytes {
            w.write_bytes(TAG_HEADER_PAYMENT, bytes);
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut response_type = ResponseType::Answer;
        let mut payment_envelope_bytes = None;
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                TAG_HEADER_RESPONSE_TYPE => response_type = ResponseType::from_wire(r.read_varint()? as u32),
                TAG_HEADER_PAYMENT => payment_envelope_bytes = Some(r.read_bytes()?.to_vec()),
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(QueryHeader {
            response_type,
            payment_envelope_bytes,
        })
    }
}

/// `CryptoGetAccountBalance`, the one concrete query named by the testable
/// scenarios (S2); the exhaustive per-query-kind builders are a non-goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalanceQuery {
    pub header: QueryHeader,
    pub account_id: EntityId,
}

const TAG_QUERY_HEADER: u32 = 1;
const TAG_QUERY_ACCOUNT: u32 = 2;

impl WireCodec for AccountBalanceQuery {
    fn encode(&self, w: &mut WireWriter) {
        w.write_nested(TAG_QUERY_HEADER, |c| self.header.encode(c));
        w.write_nested(TAG_QUERY_ACCOUNT, |c| self.account_id.encode(c));
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut header = None;
        let mut account_id = EntityId::new(0, 0, 0);
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                TAG_QUERY_HEADER => header = Some(QueryHeader::decode_from_slice(r.read_bytes()?)?),
                TAG_QUERY_ACCOUNT => account_id = EntityId::decode_from_slice(r.read_bytes()?)?,
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(AccountBalanceQuery {
            header: header.ok_or(DecodeError::Malformed("missing query header"))?,
            account_id,
        })
    }
}

/// Runs a `COST_ANSWER` probe against whichever node the network currently
/// picks, with no retry: a cost probe is informational and the caller is
/// expected to re-probe if the node it asked is unhealthy (§4.4).
pub async fn probe_account_balance_cost<S: NodeSender>(
    engine: &ExecutionEngine<S>,
    account_id: EntityId,
) -> Result<Hbar, ClientError> {
    let query = AccountBalanceQuery {
        header: QueryHeader {
            response_type: ResponseType::CostAnswer,
            payment_envelope_bytes: None,
        },
        account_id,
    };
    let payload = query.encode_to_vec();

    let mut rng = rand::rng();
    let node_index = engine.network().pick(Instant::now(), &mut rng).await;
    let node_account_id = engine.network().node_account_id(node_index).await;
    let raw_response = engine
        .sender()
        .send(node_index, &payload)
        .await
        .map_err(|source| ClientError::Transport {
            source,
            node: node_account_id,
        })?;
    let response = TransactionResponse::decode_from_slice(&raw_response)?;
    let cost = response
        .cost
        .ok_or(ClientError::Config("cost-answer response carried no cost"))?;
    Ok(Hbar::from_tinybars(cost as i64))
}
