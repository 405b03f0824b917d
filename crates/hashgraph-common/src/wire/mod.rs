//! Tag/length-value wire codec (protobuf-compatible): `field = (field_number << 3 |
//! wire_type)` followed by a type-dependent payload. See [`writer::WireWriter`] and
//! [`reader::WireReader`] for the primitive operations, and [`scalar::WireCodec`] for
//! the trait every on-wire message implements.

pub mod field;
pub mod reader;
pub mod scalar;
pub mod writer;

pub use field::{make_tag, split_tag, zigzag_decode, zigzag_encode, WireType};
pub use reader::WireReader;
pub use scalar::{WireCodec, WireScalar};
pub use writer::WireWriter;

pub use hashgraph_macros::WireStruct;
