//! Decode-time failures shared by the tag/length wire codec and the
//! recursive-length-prefix codec.

/// Failure surfaced while decoding a wire-codec or recursive-length-prefix
/// payload. Malformed input is always a fatal decode error; there is no
/// partial-success variant.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    #[error("input ended before a complete field could be read")]
    Truncated,

    #[error("varint exceeds 10 bytes")]
    VarintTooLong,

    #[error("length-delimited field claims {0} bytes but only {1} remain")]
    LengthOutOfRange(u64, usize),

    #[error("unknown or reserved wire type {0}")]
    InvalidWireType(u8),

    #[error("field is not valid UTF-8")]
    InvalidUtf8,

    #[error("non-minimal length prefix encoding")]
    NonMinimalLength,

    #[error("recursive-length-prefix depth exceeds the allowed bound")]
    DepthExceeded,

    #[error("malformed field: {0}")]
    Malformed(&'static str),
}
