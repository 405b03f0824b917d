//! Entity identifiers: `(shard, realm, num)` triples, optionally carrying an
//! alias in place of `num`. Distinct domain kinds (account, contract, file,
//! token, topic, schedule) wrap this layout in their own newtype to avoid
//! category confusion; this module provides the shared representation.

use std::fmt;

use crate::error::DecodeError;
use crate::wire::{WireCodec, WireReader, WireWriter};

/// `(shard, realm, num)` plus an optional alias. An alias and a nonzero
/// `num` are mutually exclusive on the wire; if both are set on a builder,
/// the serializer prefers the alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
    pub alias: Option<Vec<u8>>,
}

impl EntityId {
    pub fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self {
            shard,
            realm,
            num,
            alias: None,
        }
    }

    pub fn with_alias(shard: u64, realm: u64, alias: Vec<u8>) -> Self {
        Self {
            shard,
            realm,
            num: 0,
            alias: Some(alias),
        }
    }

    /// Parses `shard.realm.num`, `shard.realm.num-csum`, or
    /// `shard.realm.<hex alias>`. The checksum, if present, is validated
    /// against [`checksum`] and a mismatch is rejected as malformed.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let mut parts = text.splitn(3, '.');
        let shard = parts
            .next()
            .ok_or(DecodeError::Malformed("missing shard"))?;
        let realm = parts
            .next()
            .ok_or(DecodeError::Malformed("missing realm"))?;
        let rest = parts
            .next()
            .ok_or(DecodeError::Malformed("missing num or alias"))?;

        let shard: u64 = shard
            .parse()
            .map_err(|_| DecodeError::Malformed("shard is not a non-negative integer"))?;
        let realm: u64 = realm
            .parse()
            .map_err(|_| DecodeError::Malformed("realm is not a non-negative integer"))?;

        if let Some((num_text, csum)) = rest.split_once('-') {
            let num: u64 = num_text
                .parse()
                .map_err(|_| DecodeError::Malformed("num is not a non-negative integer"))?;
            let id = EntityId::new(shard, realm, num);
            if checksum(&id) != csum {
                return Err(DecodeError::Malformed("checksum does not match id"));
            }
            return Ok(id);
        }

        if let Ok(num) = rest.parse::<u64>() {
            return Ok(EntityId::new(shard, realm, num));
        }

        // Not a decimal `num` -- treat the remainder as a raw hex alias.
        let alias =
            hex::decode(rest).map_err(|_| DecodeError::Malformed("alias is not valid hex"))?;
        Ok(EntityId::with_alias(shard, realm, alias))
    }

    /// Formats as `shard.realm.num`, or `shard.realm.<hex alias>` when this
    /// id has an alias. The checksum suffix is never emitted here; callers
    /// that want it call [`format_with_checksum`](Self::format_with_checksum).
    pub fn format(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{}.{}.{}", self.shard, self.realm, hex::encode(alias)),
            None => format!("{}.{}.{}", self.shard, self.realm, self.num),
        }
    }

    pub fn format_with_checksum(&self) -> String {
        format!("{}-{}", self.format(), checksum(self))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl WireCodec for EntityId {
    fn encode(&self, w: &mut WireWriter) {
        w.write_sint(1, self.shard as i64);
        w.write_sint(2, self.realm as i64);
        match &self.alias {
            Some(alias) => w.write_bytes(4, alias),
            None => w.write_sint(3, self.num as i64),
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let mut id = EntityId::new(0, 0, 0);
        while let Some((field_number, wire_type)) = r.read_tag()? {
            match field_number {
                1 => id.shard = r.read_sint()? as u64,
                2 => id.realm = r.read_sint()? as u64,
                3 => id.num = r.read_sint()? as u64,
                4 => id.alias = Some(r.read_bytes()?.to_vec()),
                _ => r.skip_field(wire_type)?,
            }
        }
        Ok(id)
    }
}

/// Computes the checksum suffix for the textual identifier form.
///
/// The upstream production network's checksum algorithm was not available
/// in any retrievable reference material for this crate (see the design
/// ledger). This is a deterministic, internally-consistent placeholder: a
/// CRC-32 (IEEE polynomial) over the id's big-endian-encoded `(shard, realm,
/// num-or-alias)` reduced to five lowercase letters. It round-trips through
/// [`EntityId::parse`]/[`EntityId::format_with_checksum`] but is **not**
/// claimed to match the production network's own checksum bytes.
pub fn checksum(id: &EntityId) -> String {
    let mut bytes = Vec::with_capacity(24);
    bytes.extend_from_slice(&id.shard.to_be_bytes());
    bytes.extend_from_slice(&id.realm.to_be_bytes());
    match &id.alias {
        Some(alias) => bytes.extend_from_slice(alias),
        None => bytes.extend_from_slice(&id.num.to_be_bytes()),
    }

    let crc = crc32_ieee(&bytes);
    let mut out = String::with_capacity(5);
    let mut value = crc;
    for _ in 0..5 {
        let letter = (value % 26) as u8;
        out.push((b'a' + letter) as char);
        value /= 26;
    }
    out
}

fn crc32_ieee(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_round_trip() {
        for (s, r, n) in [(0u64, 0u64, 0u64), (1, 2, 3), (0, 0, u32::MAX as u64)] {
            let text = format!("{s}.{r}.{n}");
            let id = EntityId::parse(&text).unwrap();
            assert_eq!((id.shard, id.realm, id.num), (s, r, n));
            assert_eq!(id.format(), text);
        }
    }

    #[test]
    fn checksum_round_trips_through_parse() {
        let id = EntityId::new(0, 0, 98);
        let text = id.format_with_checksum();
        let parsed = EntityId::parse(&text).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let id = EntityId::new(0, 0, 98);
        let mut text = id.format_with_checksum();
        text.pop();
        text.push(if text.ends_with('a') { 'b' } else { 'a' });
        assert!(EntityId::parse(&text).is_err());
    }

    #[test]
    fn alias_form_round_trips() {
        let alias = vec![0xAAu8; 20];
        let id = EntityId::with_alias(0, 0, alias.clone());
        let text = id.format();
        let parsed = EntityId::parse(&text).unwrap();
        assert_eq!(parsed.alias, Some(alias));
    }

    #[test]
    fn wire_round_trip_prefers_alias() {
        let mut id = EntityId::new(0, 0, 5);
        id.alias = Some(vec![1, 2, 3]);
        let bytes = id.encode_to_vec();
        let decoded = EntityId::decode_from_slice(&bytes).unwrap();
        assert_eq!(decoded.alias, Some(vec![1, 2, 3]));
        assert_eq!(decoded.num, 0);
    }
}
