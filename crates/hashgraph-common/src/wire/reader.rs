use crate::error::DecodeError;

use super::field::{split_tag, zigzag_decode, WireType};

/// Cursor over a borrowed byte slice, decoding tag/length-value fields.
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_raw_varint(&mut self) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        for i in 0..10u32 {
            let byte = *self.buf.get(self.pos).ok_or(DecodeError::Truncated)?;
            self.pos += 1;
            result |= ((byte & 0x7f) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(DecodeError::VarintTooLong)
    }

    /// Reads the next field's tag, or `None` if the buffer is exhausted.
    pub fn read_tag(&mut self) -> Result<Option<(u32, WireType)>, DecodeError> {
        if self.is_empty() {
            return Ok(None);
        }
        let tag = self.read_raw_varint()?;
        let (field_number, wire_type_bits) = split_tag(tag);
        let wire_type = WireType::from_tag_bits(wire_type_bits)
            .ok_or(DecodeError::InvalidWireType(wire_type_bits))?;
        Ok(Some((field_number, wire_type)))
    }

    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        self.read_raw_varint()
    }

    pub fn read_sint(&mut self) -> Result<i64, DecodeError> {
        Ok(zigzag_decode(self.read_raw_varint()?))
    }

    pub fn read_fixed32(&mut self) -> Result<u32, DecodeError> {
        if self.remaining() < 4 {
            return Err(DecodeError::Truncated);
        }
        let bytes: [u8; 4] = self.buf[self.pos..self.pos + 4].try_into().unwrap();
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_fixed64(&mut self) -> Result<u64, DecodeError> {
        if self.remaining() < 8 {
            return Err(DecodeError::Truncated);
        }
        let bytes: [u8; 8] = self.buf[self.pos..self.pos + 8].try_into().unwrap();
        self.pos += 8;
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_raw_varint()?;
        if len > self.remaining() as u64 {
            return Err(DecodeError::LengthOutOfRange(len, self.remaining()));
        }
        let start = self.pos;
        self.pos += len as usize;
        Ok(&self.buf[start..self.pos])
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    pub fn read_packed_varint(&mut self) -> Result<Vec<u64>, DecodeError> {
        let bytes = self.read_bytes()?;
        let mut inner = WireReader::new(bytes);
        let mut out = Vec::new();
        while !inner.is_empty() {
            out.push(inner.read_raw_varint()?);
        }
        Ok(out)
    }

    /// Skips a field's payload of the given wire type, without interpreting it.
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => {
                self.read_raw_varint()?;
            }
            WireType::Fixed32 => {
                self.read_fixed32()?;
            }
            WireType::Fixed64 => {
                self.read_fixed64()?;
            }
            WireType::LengthDelimited => {
                self.read_bytes()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::writer::WireWriter;
    use super::*;

    #[test]
    fn tag_skip_soundness() {
        let mut w = WireWriter::new();
        w.write_varint(1, 42);
        w.write_bytes(99, b"unknown field payload");
        w.write_string(2, "after");
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        let (f1, wt1) = r.read_tag().unwrap().unwrap();
        assert_eq!(f1, 1);
        assert_eq!(r.read_varint().unwrap(), 42);
        let _ = wt1;

        let (f2, wt2) = r.read_tag().unwrap().unwrap();
        assert_eq!(f2, 99);
        r.skip_field(wt2).unwrap();

        let (f3, _) = r.read_tag().unwrap().unwrap();
        assert_eq!(f3, 2);
        assert_eq!(r.read_string().unwrap(), "after");
        assert!(r.is_empty());
    }

    #[test]
    fn length_delimited_rejects_overrun() {
        let mut w = WireWriter::new();
        w.write_raw_varint(1000);
        let bytes = w.into_bytes();
        let mut r = WireReader::new(&bytes);
        assert!(matches!(
            r.read_bytes(),
            Err(DecodeError::LengthOutOfRange(1000, 0))
        ));
    }

    #[test]
    fn varint_rejects_overlong_encoding() {
        let bytes = vec![0x80; 11];
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_raw_varint(), Err(DecodeError::VarintTooLong));
    }
}
