//! Recursive-length-prefix codec used for external-chain transaction
//! envelopes (legacy, access-list and fee-market variants). Two item
//! kinds: a raw byte string, and an ordered list of items.

use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    String(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        RlpItem::String(bytes.into())
    }

    /// Encodes a non-negative integer as its minimal big-endian
    /// representation; zero encodes as the empty string, per the codec's
    /// convention of treating leading zero bytes as non-minimal.
    pub fn uint(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let first_nonzero = bytes.iter().position(|&b| b != 0);
        match first_nonzero {
            Some(i) => RlpItem::String(bytes[i..].to_vec()),
            None => RlpItem::String(Vec::new()),
        }
    }

    pub fn as_uint(&self) -> Result<u64, DecodeError> {
        match self {
            RlpItem::String(bytes) => {
                if bytes.len() > 8 {
                    return Err(DecodeError::Malformed("integer wider than 8 bytes"));
                }
                let mut buf = [0u8; 8];
                buf[8 - bytes.len()..].copy_from_slice(bytes);
                Ok(u64::from_be_bytes(buf))
            }
            RlpItem::List(_) => Err(DecodeError::Malformed("expected string, found list")),
        }
    }
}

const MAX_DEPTH: usize = 6;
const MAX_TOTAL_SIZE: usize = 64 * 1024;

pub fn encode(item: &RlpItem) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(item, &mut out);
    out
}

fn encode_into(item: &RlpItem, out: &mut Vec<u8>) {
    match item {
        RlpItem::String(bytes) => {
            if bytes.len() == 1 && bytes[0] < 0x80 {
                out.push(bytes[0]);
            } else if bytes.len() <= 55 {
                out.push(0x80 + bytes.len() as u8);
                out.extend_from_slice(bytes);
            } else {
                let len_bytes = minimal_be_bytes(bytes.len() as u64);
                out.push(0xB7 + len_bytes.len() as u8);
                out.extend_from_slice(&len_bytes);
                out.extend_from_slice(bytes);
            }
        }
        RlpItem::List(items) => {
            let mut payload = Vec::new();
            for child in items {
                encode_into(child, &mut payload);
            }
            if payload.len() <= 55 {
                out.push(0xC0 + payload.len() as u8);
                out.extend_from_slice(&payload);
            } else {
                let len_bytes = minimal_be_bytes(payload.len() as u64);
                out.push(0xF7 + len_bytes.len() as u8);
                out.extend_from_slice(&len_bytes);
                out.extend_from_slice(&payload);
            }
        }
    }
}

fn minimal_be_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[first_nonzero..].to_vec()
}

pub fn decode(buf: &[u8]) -> Result<RlpItem, DecodeError> {
    if buf.len() > MAX_TOTAL_SIZE {
        return Err(DecodeError::Malformed("payload exceeds maximum size"));
    }
    let mut pos = 0usize;
    let item = decode_item(buf, &mut pos, 0)?;
    if pos != buf.len() {
        return Err(DecodeError::Malformed("trailing bytes after item"));
    }
    Ok(item)
}

fn decode_item(buf: &[u8], pos: &mut usize, depth: usize) -> Result<RlpItem, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::DepthExceeded);
    }
    let prefix = *buf.get(*pos).ok_or(DecodeError::Truncated)?;

    if prefix < 0x80 {
        *pos += 1;
        return Ok(RlpItem::String(vec![prefix]));
    }

    if prefix <= 0xB7 {
        let len = (prefix - 0x80) as usize;
        *pos += 1;
        let bytes = take(buf, pos, len)?;
        if len == 1 && bytes[0] < 0x80 {
            return Err(DecodeError::NonMinimalLength);
        }
        return Ok(RlpItem::String(bytes.to_vec()));
    }

    if prefix <= 0xBF {
        let len_of_len = (prefix - 0xB7) as usize;
        *pos += 1;
        let len = read_length(buf, pos, len_of_len)?;
        if len <= 55 {
            return Err(DecodeError::NonMinimalLength);
        }
        let bytes = take(buf, pos, len)?;
        return Ok(RlpItem::String(bytes.to_vec()));
    }

    if prefix <= 0xF7 {
        let total_len = (prefix - 0xC0) as usize;
        *pos += 1;
        let end = *pos + total_len;
        if end > buf.len() {
            return Err(DecodeError::Truncated);
        }
        let mut items = Vec::new();
        while *pos < end {
            items.push(decode_item(buf, pos, depth + 1)?);
        }
        return Ok(RlpItem::List(items));
    }

    let len_of_len = (prefix - 0xF7) as usize;
    *pos += 1;
    let total_len = read_length(buf, pos, len_of_len)?;
    if total_len <= 55 {
        return Err(DecodeError::NonMinimalLength);
    }
    let end = *pos + total_len;
    if end > buf.len() {
        return Err(DecodeError::Truncated);
    }
    let mut items = Vec::new();
    while *pos < end {
        items.push(decode_item(buf, pos, depth + 1)?);
    }
    Ok(RlpItem::List(items))
}

fn read_length(buf: &[u8], pos: &mut usize, len_of_len: usize) -> Result<usize, DecodeError> {
    let bytes = take(buf, pos, len_of_len)?;
    if bytes[0] == 0 {
        return Err(DecodeError::NonMinimalLength);
    }
    let mut value: u64 = 0;
    for &b in bytes {
        value = (value << 8) | b as u64;
    }
    Ok(value as usize)
}

fn take<'a>(buf: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8], DecodeError> {
    let end = pos
        .checked_add(len)
        .ok_or(DecodeError::Malformed("length overflow"))?;
    if end > buf.len() {
        return Err(DecodeError::Truncated);
    }
    let slice = &buf[*pos..end];
    *pos = end;
    Ok(slice)
}

/// One `(address, storage_keys)` entry of an EIP-2930-style access list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessListEntry {
    pub address: Vec<u8>,
    pub storage_keys: Vec<Vec<u8>>,
}

fn encode_access_list(access_list: &[AccessListEntry]) -> RlpItem {
    RlpItem::List(
        access_list
            .iter()
            .map(|entry| {
                RlpItem::List(vec![
                    RlpItem::string(entry.address.clone()),
                    RlpItem::List(entry.storage_keys.iter().cloned().map(RlpItem::string).collect()),
                ])
            })
            .collect(),
    )
}

/// The common `(v, r, s)` signature tail shared by all three envelope
/// variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeSignature {
    pub v: u64,
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

/// An external-chain transaction envelope (§4.2, §6): a leading type byte
/// followed by the recursive-length-prefix-encoded field list for that
/// type. Legacy carries type byte `0x00` by this codec's convention; the
/// other two variants carry the EIP-2718 type byte they're named for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalChainEnvelope {
    Legacy {
        nonce: u64,
        gas_price: Vec<u8>,
        gas_limit: u64,
        to: Vec<u8>,
        value: Vec<u8>,
        data: Vec<u8>,
        sig: EnvelopeSignature,
    },
    AccessList {
        chain_id: u64,
        nonce: u64,
        gas_price: Vec<u8>,
        gas_limit: u64,
        to: Vec<u8>,
        value: Vec<u8>,
        data: Vec<u8>,
        access_list: Vec<AccessListEntry>,
        sig: EnvelopeSignature,
    },
    FeeMarket {
        chain_id: u64,
        nonce: u64,
        max_priority_fee: Vec<u8>,
        max_fee: Vec<u8>,
        gas_limit: u64,
        to: Vec<u8>,
        value: Vec<u8>,
        data: Vec<u8>,
        access_list: Vec<AccessListEntry>,
        sig: EnvelopeSignature,
    },
}

impl ExternalChainEnvelope {
    pub fn type_byte(&self) -> u8 {
        match self {
            ExternalChainEnvelope::Legacy { .. } => 0x00,
            ExternalChainEnvelope::AccessList { .. } => 0x01,
            ExternalChainEnvelope::FeeMarket { .. } => 0x02,
        }
    }

    /// Assembles the type byte and RLP field list into the wire envelope.
    pub fn encode(&self) -> Vec<u8> {
        let fields = match self {
            ExternalChainEnvelope::Legacy {
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                data,
                sig,
            } => RlpItem::List(vec![
                RlpItem::uint(*nonce),
                RlpItem::string(gas_price.clone()),
                RlpItem::uint(*gas_limit),
                RlpItem::string(to.clone()),
                RlpItem::string(value.clone()),
                RlpItem::string(data.clone()),
                RlpItem::uint(sig.v),
                RlpItem::string(sig.r.clone()),
                RlpItem::string(sig.s.clone()),
            ]),
            ExternalChainEnvelope::AccessList {
                chain_id,
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                data,
                access_list,
                sig,
            } => RlpItem::List(vec![
                RlpItem::uint(*chain_id),
                RlpItem::uint(*nonce),
                RlpItem::string(gas_price.clone()),
                RlpItem::uint(*gas_limit),
                RlpItem::string(to.clone()),
                RlpItem::string(value.clone()),
                RlpItem::string(data.clone()),
                encode_access_list(access_list),
                RlpItem::uint(sig.v),
                RlpItem::string(sig.r.clone()),
                RlpItem::string(sig.s.clone()),
            ]),
            ExternalChainEnvelope::FeeMarket {
                chain_id,
                nonce,
                max_priority_fee,
                max_fee,
                gas_limit,
                to,
                value,
                data,
                access_list,
                sig,
            } => RlpItem::List(vec![
                RlpItem::uint(*chain_id),
                RlpItem::uint(*nonce),
                RlpItem::string(max_priority_fee.clone()),
                RlpItem::string(max_fee.clone()),
                RlpItem::uint(*gas_limit),
                RlpItem::string(to.clone()),
                RlpItem::string(value.clone()),
                RlpItem::string(data.clone()),
                encode_access_list(access_list),
                RlpItem::uint(sig.v),
                RlpItem::string(sig.r.clone()),
                RlpItem::string(sig.s.clone()),
            ]),
        };
        let mut out = vec![self.type_byte()];
        out.extend(encode(&fields));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_self_encodes() {
        let item = RlpItem::string(vec![0x42]);
        assert_eq!(encode(&item), vec![0x42]);
    }

    #[test]
    fn short_string_round_trip() {
        let item = RlpItem::string(b"dog".to_vec());
        let encoded = encode(&item);
        assert_eq!(encoded, vec![0x83, b'd', b'o', b'g']);
        assert_eq!(decode(&encoded).unwrap(), item);
    }

    #[test]
    fn long_string_round_trip() {
        let bytes = vec![b'x'; 100];
        let item = RlpItem::string(bytes);
        let encoded = encode(&item);
        assert_eq!(decode(&encoded).unwrap(), item);
    }

    #[test]
    fn empty_list_round_trip() {
        let item = RlpItem::List(vec![]);
        assert_eq!(encode(&item), vec![0xC0]);
        assert_eq!(decode(&[0xC0]).unwrap(), item);
    }

    #[test]
    fn nested_list_round_trip_depth_six() {
        let mut item = RlpItem::string(b"leaf".to_vec());
        for _ in 0..6 {
            item = RlpItem::List(vec![item]);
        }
        let encoded = encode(&item);
        assert_eq!(decode(&encoded).unwrap(), item);
    }

    #[test]
    fn zero_encodes_as_empty_string() {
        assert_eq!(RlpItem::uint(0), RlpItem::String(Vec::new()));
    }

    #[test]
    fn uint_round_trip() {
        for v in [0u64, 1, 55, 56, 0x1234_5678, u64::MAX] {
            let item = RlpItem::uint(v);
            let encoded = encode(&item);
            let decoded = decode(&encoded).unwrap();
            assert_eq!(decoded.as_uint().unwrap(), v);
        }
    }

    #[test]
    fn rejects_non_minimal_short_string_length() {
        // 0x81 0x00 encodes a single zero byte as a "short string" of length 1,
        // which should have used the direct single-byte form instead.
        assert_eq!(decode(&[0x81, 0x00]), Err(DecodeError::NonMinimalLength));
    }

    #[test]
    fn rejects_truncated_input() {
        assert_eq!(decode(&[0x83, b'd', b'o']), Err(DecodeError::Truncated));
    }

    #[test]
    fn s4_fee_market_envelope_has_type_byte_two() {
        let envelope = ExternalChainEnvelope::FeeMarket {
            chain_id: 1,
            nonce: 0,
            max_priority_fee: Vec::new(),
            max_fee: Vec::new(),
            gas_limit: 21_000,
            to: vec![0xAB; 20],
            value: Vec::new(),
            data: Vec::new(),
            access_list: Vec::new(),
            sig: EnvelopeSignature {
                v: 0,
                r: vec![0x11; 32],
                s: vec![0x22; 32],
            },
        };
        let encoded = envelope.encode();
        assert_eq!(encoded[0], 0x02);
        // 12 fields: chain_id(1) + nonce(1) + max_priority_fee(1) + max_fee(1)
        // + gas_limit(3) + to(21) + value(1) + data(1) + access_list(1) + v(1)
        // + r(33) + s(33) = 98 bytes of payload, plus a 2-byte long-list header
        // (0xF8 0x62), plus the leading type byte.
        assert_eq!(encoded.len(), 1 + 2 + 98);
    }

    #[test]
    fn legacy_envelope_carries_type_byte_zero() {
        let envelope = ExternalChainEnvelope::Legacy {
            nonce: 0,
            gas_price: vec![0x04; 2],
            gas_limit: 21_000,
            to: vec![0xAB; 20],
            value: Vec::new(),
            data: Vec::new(),
            sig: EnvelopeSignature {
                v: 27,
                r: vec![0x11; 32],
                s: vec![0x22; 32],
            },
        };
        assert_eq!(envelope.encode()[0], 0x00);
    }

    #[test]
    fn access_list_envelope_round_trips_through_decode() {
        let envelope = ExternalChainEnvelope::AccessList {
            chain_id: 137,
            nonce: 5,
            gas_price: vec![0x04; 2],
            gas_limit: 21_000,
            to: vec![0xCD; 20],
            value: Vec::new(),
            data: vec![0xDE, 0xAD],
            access_list: vec![AccessListEntry {
                address: vec![0xEF; 20],
                storage_keys: vec![vec![0x01; 32]],
            }],
            sig: EnvelopeSignature {
                v: 1,
                r: vec![0x11; 32],
                s: vec![0x22; 32],
            },
        };
        let encoded = envelope.encode();
        assert_eq!(encoded[0], 0x01);
        let decoded = decode(&encoded[1..]).unwrap();
        let fields = match decoded {
            RlpItem::List(items) => items,
            RlpItem::String(_) => panic!("expected a field list"),
        };
        assert_eq!(fields.len(), 11);
        assert_eq!(fields[0].as_uint().unwrap(), 137);
    }
}
