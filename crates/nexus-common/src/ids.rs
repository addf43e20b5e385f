use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum IdParseError {
    #[error("missing id prefix")]
    MissingPrefix,
    #[error("expected prefix {expected:?}, found {found:?}")]
    WrongPrefix { expected: &'static str, found: String },
    #[error("malformed id suffix: {0}")]
    MalformedSuffix(String),
}

/// Marker trait associating an id kind with its stable `prefix_` string.
pub trait IdKind {
    const PREFIX: &'static str;
}

macro_rules! id_kind {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name;
        impl IdKind for $name {
            const PREFIX: &'static str = $prefix;
        }
    };
}

id_kind!(Tenant, "tenant");
id_kind!(Key, "key");
id_kind!(Usage, "usage");
id_kind!(Req, "req");

/// A prefix-typed, K-sortable, URL-safe identifier: `prefix_<26-char suffix>`.
///
/// The suffix is the base32 (Crockford, lowercase) encoding of a UUIDv7, so
/// identifiers minted later sort after identifiers minted earlier without
/// needing a database round-trip.
pub struct Id<K: IdKind> {
    uuid: Uuid,
    _kind: PhantomData<K>,
}

impl<K: IdKind> Id<K> {
    pub fn new() -> Self {
        Self {
            uuid: Uuid::now_v7(),
            _kind: PhantomData,
        }
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            _kind: PhantomData,
        }
    }

    pub fn prefix(&self) -> &'static str {
        K::PREFIX
    }

    fn suffix(&self) -> String {
        crockford_encode(self.uuid.as_bytes())
    }
}

impl<K: IdKind> Default for Id<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IdKind> Clone for Id<K> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K: IdKind> Copy for Id<K> {}

impl<K: IdKind> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}
impl<K: IdKind> Eq for Id<K> {}
impl<K: IdKind> std::hash::Hash for Id<K> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<K: IdKind> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", K::PREFIX, self.suffix())
    }
}

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl<K: IdKind> FromStr for Id<K> {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, suffix) = s.split_once('_').ok_or(IdParseError::MissingPrefix)?;
        if prefix != K::PREFIX {
            return Err(IdParseError::WrongPrefix {
                expected: K::PREFIX,
                found: prefix.to_string(),
            });
        }
        let bytes = crockford_decode(suffix)
            .ok_or_else(|| IdParseError::MalformedSuffix(suffix.to_string()))?;
        if bytes.len() != 16 {
            return Err(IdParseError::MalformedSuffix(suffix.to_string()));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes);
        Ok(Id::from_uuid(Uuid::from_bytes(arr)))
    }
}

impl<K: IdKind> Serialize for Id<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de, K: IdKind> Deserialize<'de> for Id<K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Id::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub type TenantId = Id<Tenant>;
pub type KeyId = Id<Key>;
pub type UsageId = Id<Usage>;
pub type RequestId = Id<Req>;

const CROCKFORD_ALPHABET: &[u8] = b"0123456789abcdefghjkmnpqrstvwxyz";

/// Encodes 16 bytes into a 26-character lowercase Crockford base32 string,
/// matching the fixed-width suffix length used by ULID-style identifiers.
fn crockford_encode(bytes: &[u8; 16]) -> String {
    let mut value: u128 = u128::from_be_bytes(*bytes);
    let mut out = vec![0u8; 26];
    for slot in out.iter_mut().rev() {
        let index = (value & 0x1f) as usize;
        *slot = CROCKFORD_ALPHABET[index];
        value >>= 5;
    }
    String::from_utf8(out).expect("crockford alphabet is ascii")
}

fn crockford_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() != 26 {
        return None;
    }
    let mut value: u128 = 0;
    for ch in s.chars() {
        let digit = CROCKFORD_ALPHABET
            .iter()
            .position(|&c| c == ch as u8)? as u128;
        value = value.checked_shl(5)?.checked_add(digit)?;
    }
    Some(value.to_be_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_parse() {
        let id: RequestId = Id::new();
        let rendered = id.to_string();
        assert!(rendered.starts_with("req_"));
        let parsed: RequestId = rendered.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_mismatched_prefix() {
        let tenant: TenantId = Id::new();
        let rendered = tenant.to_string();
        let err = rendered.parse::<KeyId>().unwrap_err();
        assert!(matches!(err, IdParseError::WrongPrefix { .. }));
    }

    #[test]
    fn ids_minted_later_sort_later() {
        let a: RequestId = Id::new();
        let b: RequestId = Id::new();
        assert!(a.to_string() <= b.to_string());
    }
}
