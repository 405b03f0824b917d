//! Per-node response classification (C9's `classify`): turns a decoded
//! [`TransactionResponse`] plus the current attempt index into one of the
//! five classes the attempt loop switches on.

use hashgraph_common::wire::{WireCodec, WireReader, WireWriter};
use hashgraph_common::DecodeError;

/// Precheck status codes the stub/real node can return before consensus.
/// `Other` carries through an unrecognized numeric code unchanged, the way
/// the reader accepts unknown wire tags rather than failing closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecheckStatus {
    Ok,
    Busy,
    PlatformNotActive,
    TransactionExpired,
    DuplicateTransaction,
    InvalidSignature,
    InsufficientTxFee,
    Other(u32),
}

impl PrecheckStatus {
    fn to_wire(self) -> u32 {
        match self {
            PrecheckStatus::Ok => 0,
            PrecheckStatus::InvalidSignature => 1,
            PrecheckStatus::InsufficientTxFee => 2,
            PrecheckStatus::TransactionExpired => 3,
            PrecheckStatus::Busy => 4,
            PrecheckStatus::DuplicateTransaction => 5,
            PrecheckStatus::PlatformNotActive => 6,
            PrecheckStatus::Other(code) => code,
        }
    }

    fn from_wire(code: u32) -> Self {
        match code {
            0 => PrecheckStatus::Ok,
            1 => PrecheckStatus::InvalidSignature,
            2 => PrecheckStatus::InsufficientTxFee,
            3 => PrecheckStatus::TransactionExpired,
            4 => PrecheckStatus::Busy,
            5 => PrecheckStatus::DuplicateTransaction,
            6 => PrecheckStatus::PlatformNotActive,
            other => PrecheckStatus::Other(other),
        }
    }
}

/// A node's reply to a submitted transaction or a cost probe. `cost` is
/// only meaningful for a `COST_ANSWER` query response (S2); `created_id`
/// is populated once the receipt pump (C10) observes a terminal receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResponse {
    pub precheck: PrecheckStatus,
    pub cost: Option<u64>,
}

impl TransactionResponse {
    pub fn ok() -> Self {
        Self {
            precheck: PrecheckStatus::Ok,
            cost: None,
        }
    }
}

impl WireCodec for TransactionResponse {
    fn encode(&self, w: &mut WireWriter) {
        w.write_varint(1, self.precheck.to_wire() as u64);
        if let Some(cost) = self.cost {
            w.write_varint(2, cost);
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut precheck = PrecheckStatus::Ok;
        let mut cost = None;
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                1 => precheck = PrecheckStatus::from_wire(r.read_varint()? as u32),
                2 => cost = Some(r.read_varint()?),
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(TransactionResponse { precheck, cost })
    }
}

/// One of the five classes the attempt loop in §4.6 switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    OkTerminal,
    RetrySameNode,
    RetryOtherNode,
    RegenTxId,
    ErrorTerminal,
}

/// Classifies a decoded node response. `attempt_index` is zero-based;
/// a `DUPLICATE_TRANSACTION` on attempt 0 is a terminal error, but on any
/// later attempt it is treated as implicit prior success (see the design
/// ledger's resolved open question on this).
pub fn classify(response: &TransactionResponse, attempt_index: u32, regenerate_tx_id: bool) -> Classification {
    match response.precheck {
        PrecheckStatus::Ok => Classification::OkTerminal,
        PrecheckStatus::Busy | PrecheckStatus::PlatformNotActive => Classification::RetryOtherNode,
        PrecheckStatus::TransactionExpired => {
            if regenerate_tx_id {
                Classification::RegenTxId
            } else {
                Classification::ErrorTerminal
            }
        }
        PrecheckStatus::DuplicateTransaction => {
            if attempt_index == 0 {
                Classification::ErrorTerminal
            } else {
                Classification::OkTerminal
            }
        }
        PrecheckStatus::InvalidSignature
        | PrecheckStatus::InsufficientTxFee
        | PrecheckStatus::Other(_) => Classification::ErrorTerminal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_is_retry_other_node() {
        let resp = TransactionResponse {
            precheck: PrecheckStatus::Busy,
            cost: None,
        };
        assert_eq!(classify(&resp, 0, true), Classification::RetryOtherNode);
    }

    #[test]
    fn expired_regenerates_only_when_enabled() {
        let resp = TransactionResponse {
            precheck: PrecheckStatus::TransactionExpired,
            cost: None,
        };
        assert_eq!(classify(&resp, 0, true), Classification::RegenTxId);
        assert_eq!(classify(&resp, 0, false), Classification::ErrorTerminal);
    }

    #[test]
    fn duplicate_is_terminal_on_first_attempt_and_ok_later() {
        let resp = TransactionResponse {
            precheck: PrecheckStatus::DuplicateTransaction,
            cost: None,
        };
        assert_eq!(classify(&resp, 0, true), Classification::ErrorTerminal);
        assert_eq!(classify(&resp, 1, true), Classification::OkTerminal);
    }

    #[test]
    fn response_wire_round_trip_with_cost() {
        let resp = TransactionResponse {
            precheck: PrecheckStatus::Ok,
            cost: Some(100_000),
        };
        let bytes = resp.encode_to_vec();
        assert_eq!(TransactionResponse::decode_from_slice(&bytes).unwrap(), resp);
    }
}
