pub mod error;
pub mod ids;
pub mod rlp;
pub mod time;
pub mod wire;

pub use error::DecodeError;
pub use ids::EntityId;
pub use rlp::{AccessListEntry, EnvelopeSignature, ExternalChainEnvelope, RlpItem};
pub use time::{Duration, Timestamp};
