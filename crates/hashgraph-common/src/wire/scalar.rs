use crate::error::DecodeError;

use super::field::WireType;
use super::reader::WireReader;
use super::writer::WireWriter;

/// A field type the `WireStruct` derive can read and write directly,
/// without the struct author needing to spell out wire-type matching by hand.
pub trait WireScalar: Sized {
    fn write_field(&self, field_number: u32, w: &mut WireWriter);
    fn merge_field(&mut self, wire_type: WireType, r: &mut WireReader<'_>)
        -> Result<(), DecodeError>;
}

macro_rules! impl_varint_scalar {
    ($ty:ty, unsigned) => {
        impl WireScalar for $ty {
            fn write_field(&self, field_number: u32, w: &mut WireWriter) {
                w.write_varint(field_number, *self as u64);
            }
            fn merge_field(
                &mut self,
                wire_type: WireType,
                r: &mut WireReader<'_>,
            ) -> Result<(), DecodeError> {
                if wire_type != WireType::Varint {
                    return Err(DecodeError::Malformed("expected varint wire type"));
                }
                *self = r.read_varint()? as $ty;
                Ok(())
            }
        }
    };
    ($ty:ty, signed) => {
        impl WireScalar for $ty {
            fn write_field(&self, field_number: u32, w: &mut WireWriter) {
                w.write_sint(field_number, *self as i64);
            }
            fn merge_field(
                &mut self,
                wire_type: WireType,
                r: &mut WireReader<'_>,
            ) -> Result<(), DecodeError> {
                if wire_type != WireType::Varint {
                    return Err(DecodeError::Malformed("expected varint wire type"));
                }
                *self = r.read_sint()? as $ty;
                Ok(())
            }
        }
    };
}

impl_varint_scalar!(u64, unsigned);
impl_varint_scalar!(u32, unsigned);
impl_varint_scalar!(i64, signed);
impl_varint_scalar!(i32, signed);

impl WireScalar for bool {
    fn write_field(&self, field_number: u32, w: &mut WireWriter) {
        w.write_bool(field_number, *self);
    }
    fn merge_field(
        &mut self,
        wire_type: WireType,
        r: &mut WireReader<'_>,
    ) -> Result<(), DecodeError> {
        if wire_type != WireType::Varint {
            return Err(DecodeError::Malformed("expected varint wire type"));
        }
        *self = r.read_varint()? != 0;
        Ok(())
    }
}

impl WireScalar for String {
    fn write_field(&self, field_number: u32, w: &mut WireWriter) {
        w.write_string(field_number, self);
    }
    fn merge_field(
        &mut self,
        wire_type: WireType,
        r: &mut WireReader<'_>,
    ) -> Result<(), DecodeError> {
        if wire_type != WireType::LengthDelimited {
            return Err(DecodeError::Malformed("expected length-delimited wire type"));
        }
        *self = r.read_string()?;
        Ok(())
    }
}

impl WireScalar for Vec<u8> {
    fn write_field(&self, field_number: u32, w: &mut WireWriter) {
        w.write_bytes(field_number, self);
    }
    fn merge_field(
        &mut self,
        wire_type: WireType,
        r: &mut WireReader<'_>,
    ) -> Result<(), DecodeError> {
        if wire_type != WireType::LengthDelimited {
            return Err(DecodeError::Malformed("expected length-delimited wire type"));
        }
        *self = r.read_bytes()?.to_vec();
        Ok(())
    }
}

/// Implemented by every message type this crate can put on the wire,
/// whether hand-written (recursive/union shapes) or `#[derive(WireStruct)]`-generated
/// (flat scalar-only shapes).
pub trait WireCodec: Sized {
    fn encode(&self, w: &mut WireWriter);
    fn decode(r: &mut WireReader<'_>) -> Result<Self, DecodeError>;

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    fn decode_from_slice(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut r = WireReader::new(buf);
        Self::decode(&mut r)
    }
}
