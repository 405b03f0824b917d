pub mod derivation;
pub mod error;
pub mod hash;
pub mod key;
pub mod mnemonic;
pub mod signature_map;
pub mod signer;

pub use error::CryptoError;
pub use key::{Key, MAX_KEY_DEPTH};
pub use signature_map::{CurveKind, SignatureMap};
pub use signer::Signer;
