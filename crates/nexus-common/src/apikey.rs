use rand::RngCore;
use sha2::{Digest, Sha256};

pub const API_KEY_PREFIX: &str = "nxs_";
pub const API_KEY_SECRET_HEX_LEN: usize = 64;
/// Number of characters of the full key (including `nxs_`) that are indexed
/// for fast lookup; the remainder only ever exists as a SHA-256 hash.
pub const API_KEY_INDEXED_PREFIX_LEN: usize = 12;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiKeyError {
    #[error("api key missing required '{API_KEY_PREFIX}' prefix")]
    MissingPrefix,
    #[error("api key secret must be {API_KEY_SECRET_HEX_LEN} hex characters, found {0}")]
    WrongLength(usize),
    #[error("api key secret is not valid hex")]
    NotHex,
}

/// A freshly minted API key: the plaintext form (shown to the user exactly
/// once), its indexed prefix, and the SHA-256 hash that is the only form
/// ever persisted.
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    pub plaintext: String,
    pub indexed_prefix: String,
    pub hash: String,
}

pub fn generate() -> GeneratedApiKey {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let plaintext = format!("{API_KEY_PREFIX}{}", hex::encode(bytes));
    let indexed_prefix = plaintext[..API_KEY_INDEXED_PREFIX_LEN].to_string();
    let hash = hash_key(&plaintext);
    GeneratedApiKey {
        plaintext,
        indexed_prefix,
        hash,
    }
}

pub fn validate_format(candidate: &str) -> Result<(), ApiKeyError> {
    let secret = candidate
        .strip_prefix(API_KEY_PREFIX)
        .ok_or(ApiKeyError::MissingPrefix)?;
    if secret.len() != API_KEY_SECRET_HEX_LEN {
        return Err(ApiKeyError::WrongLength(secret.len()));
    }
    if !secret.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ApiKeyError::NotHex);
    }
    Ok(())
}

pub fn hash_key(candidate: &str) -> String {
    let digest = Sha256::digest(candidate.as_bytes());
    hex::encode(digest)
}

pub fn indexed_prefix(candidate: &str) -> Option<&str> {
    candidate.get(..API_KEY_INDEXED_PREFIX_LEN)
}

/// Minimal hex codec so this crate does not need the `hex` dependency just
/// for two call sites.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        use std::fmt::Write;
        let mut out = String::with_capacity(bytes.as_ref().len() * 2);
        for b in bytes.as_ref() {
            let _ = write!(out, "{b:02x}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_round_trips_validation_and_hash() {
        let key = generate();
        assert!(key.plaintext.starts_with(API_KEY_PREFIX));
        validate_format(&key.plaintext).unwrap();
        assert_eq!(hash_key(&key.plaintext), key.hash);
        assert_eq!(
            indexed_prefix(&key.plaintext).unwrap(),
            key.indexed_prefix
        );
    }

    #[test]
    fn rejects_missing_prefix() {
        assert_eq!(
            validate_format("sk-deadbeef"),
            Err(ApiKeyError::MissingPrefix)
        );
    }

    #[test]
    fn rejects_wrong_length() {
        let err = validate_format("nxs_abcd").unwrap_err();
        assert!(matches!(err, ApiKeyError::WrongLength(_)));
    }

    #[test]
    fn rejects_non_hex_secret() {
        let secret = "z".repeat(API_KEY_SECRET_HEX_LEN);
        let err = validate_format(&format!("{API_KEY_PREFIX}{secret}")).unwrap_err();
        assert_eq!(err, ApiKeyError::NotHex);
    }
}
