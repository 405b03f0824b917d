//! Mnemonic passphrase decoding (C5). Recognizes 12-, 22-, and 24-word
//! phrases; the seed is produced via a salted key-stretching function.

use hmac::Hmac;
use sha2::Sha512;

use crate::error::CryptoError;

/// Selects the PBKDF2 iteration count used for the legacy 22-word phrase's
/// key stretching. Carried by the mnemonic metadata per the domain model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfAlgorithm {
    Legacy2048,
    Modern10000,
}

impl KdfAlgorithm {
    fn iterations(self) -> u32 {
        match self {
            KdfAlgorithm::Legacy2048 => 2_048,
            KdfAlgorithm::Modern10000 => 10_000,
        }
    }
}

/// Derives a 64-byte seed from a recognized mnemonic phrase.
///
/// 12- and 24-word phrases are standard BIP-39 (PBKDF2-HMAC-SHA512, 2048
/// rounds, the standard English word list, including its checksum
/// validation). The 22-word legacy variant's word list and checksum
/// algorithm were not present in any retrievable reference material for
/// this crate; see the checksum note on [`legacy_seed`] for what that
/// path can and cannot guarantee.
pub fn seed_from_mnemonic(
    words: &[&str],
    passphrase: &str,
    legacy_algorithm: KdfAlgorithm,
) -> Result<[u8; 64], CryptoError> {
    match words.len() {
        12 | 24 => bip39_seed(words, passphrase),
        22 => legacy_seed(words, passphrase, legacy_algorithm),
        other => Err(CryptoError::UnsupportedMnemonicLength(other)),
    }
}

fn bip39_seed(words: &[&str], passphrase: &str) -> Result<[u8; 64], CryptoError> {
    let phrase = words.join(" ");
    let mnemonic = bip39::Mnemonic::parse_in_normalized(bip39::Language::English, &phrase)
        .map_err(|_| CryptoError::BadMnemonicChecksum)?;
    Ok(mnemonic.to_seed(passphrase))
}

/// Stretches a 22-word legacy phrase into a seed.
///
/// This validates word count only. Without the legacy word list and
/// checksum construction, words cannot be mapped back to entropy bits or
/// checked against a checksum the way the 12-/24-word path does; this
/// function instead stretches the joined phrase text directly as the
/// PBKDF2 password, which keeps the call shape uniform across all three
/// word counts without claiming a compatibility guarantee it cannot meet.
fn legacy_seed(
    words: &[&str],
    passphrase: &str,
    algorithm: KdfAlgorithm,
) -> Result<[u8; 64], CryptoError> {
    if words.len() != 22 {
        return Err(CryptoError::UnsupportedMnemonicLength(words.len()));
    }
    let phrase = words.join(" ");
    let mut seed = [0u8; 64];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(
        phrase.as_bytes(),
        passphrase.as_bytes(),
        algorithm.iterations(),
        &mut seed,
    )
    .map_err(|_| CryptoError::MalformedPrivateKey("pbkdf2 output length mismatch"))?;
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_word_count() {
        let words: Vec<&str> = vec!["abandon"; 15];
        let err = seed_from_mnemonic(&words, "", KdfAlgorithm::Legacy2048).unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedMnemonicLength(15)));
    }

    #[test]
    fn legacy_seed_is_deterministic() {
        let words: Vec<&str> = vec!["alpha"; 22];
        let a = legacy_seed(&words, "pass", KdfAlgorithm::Legacy2048).unwrap();
        let b = legacy_seed(&words, "pass", KdfAlgorithm::Legacy2048).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn legacy_seed_differs_by_passphrase() {
        let words: Vec<&str> = vec!["alpha"; 22];
        let a = legacy_seed(&words, "pass1", KdfAlgorithm::Legacy2048).unwrap();
        let b = legacy_seed(&words, "pass2", KdfAlgorithm::Legacy2048).unwrap();
        assert_ne!(a, b);
    }
}
