/// Failures from signing, verification, derivation, and mnemonic decoding.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("signature does not verify against the given public key")]
    VerifyFailed,

    #[error("unsupported or unrecognized curve kind")]
    UnsupportedCurve,

    #[error("malformed public key: {0}")]
    MalformedPublicKey(&'static str),

    #[error("malformed private key: {0}")]
    MalformedPrivateKey(&'static str),

    #[error("derivation path exceeds the maximum supported depth")]
    DerivationDepthExceeded,

    #[error("mnemonic has an unsupported word count (expected 12, 22, or 24, got {0})")]
    UnsupportedMnemonicLength(usize),

    #[error("mnemonic word is not in the recognized word list")]
    UnknownMnemonicWord,

    #[error("mnemonic checksum does not match")]
    BadMnemonicChecksum,

    #[error("signature map's key tree exceeds the maximum supported depth")]
    KeyDepthExceeded,
}
