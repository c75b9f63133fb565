// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use crate::error::{EmberHashError, HashResult};
use crate::settings::HASH_SIZE_BYTES;
use std::{cmp::Ordering, convert::TryInto, str::FromStr};

/// Hash wrapper, the underlying digest is `Blake3`
#[derive(Eq, PartialEq, Copy, Clone, Hash)]
pub struct Hash(blake3::Hash);

impl PartialOrd for Hash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hash {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}

impl Hash {
    /// Compute a hash from data.
    ///
    /// # Example
    ///  ```
    /// # use ember_hash::Hash;
    /// let hash = Hash::compute_from(&"hello world".as_bytes());
    /// ```
    pub fn compute_from(data: &[u8]) -> Self {
        Hash(blake3::hash(data))
    }

    /// Serialize a Hash using `bs58` encoding with checksum.
    pub fn to_bs58_check(&self) -> String {
        bs58::encode(self.to_bytes()).with_check().into_string()
    }

    /// Reference to the underlying digest bytes.
    pub fn to_bytes(&self) -> &[u8; HASH_SIZE_BYTES] {
        self.0.as_bytes()
    }

    /// Convert into the underlying digest bytes.
    pub fn into_bytes(self) -> [u8; HASH_SIZE_BYTES] {
        *self.0.as_bytes()
    }

    /// Build a Hash from raw digest bytes.
    pub fn from_bytes(data: &[u8; HASH_SIZE_BYTES]) -> Self {
        Hash(blake3::Hash::from(*data))
    }

    /// Deserialize a Hash from a `bs58` string with checksum.
    pub fn from_bs58_check(data: &str) -> HashResult<Self> {
        let decoded = bs58::decode(data)
            .with_check(None)
            .into_vec()
            .map_err(|err| EmberHashError::ParsingError(err.to_string()))?;
        let bytes: [u8; HASH_SIZE_BYTES] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| EmberHashError::WrongHashSize(HASH_SIZE_BYTES, decoded.len()))?;
        Ok(Hash::from_bytes(&bytes))
    }
}

impl FromStr for Hash {
    type Err = EmberHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_bs58_check(s)
    }
}

impl ::serde::Serialize for Hash {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_bs58_check())
        } else {
            s.serialize_bytes(self.to_bytes())
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for Hash {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Hash, D::Error> {
        if d.is_human_readable() {
            struct Base58CheckVisitor;

            impl<'de> ::serde::de::Visitor<'de> for Base58CheckVisitor {
                type Value = Hash;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("an ASCII base58check string")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    Hash::from_bs58_check(v).map_err(E::custom)
                }
            }
            d.deserialize_str(Base58CheckVisitor)
        } else {
            struct BytesVisitor;

            impl<'de> ::serde::de::Visitor<'de> for BytesVisitor {
                type Value = Hash;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a bytestring")
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    let bytes: [u8; HASH_SIZE_BYTES] = v.try_into().map_err(|_| {
                        E::invalid_length(v.len(), &"a digest-sized bytestring")
                    })?;
                    Ok(Hash::from_bytes(&bytes))
                }
            }
            d.deserialize_bytes(BytesVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bs58_check_round_trip() {
        let hash = Hash::compute_from(b"ember");
        let text = hash.to_bs58_check();
        assert_eq!(Hash::from_bs58_check(&text).unwrap(), hash);
    }

    #[test]
    fn compute_from_is_deterministic() {
        assert_eq!(Hash::compute_from(b"abc"), Hash::compute_from(b"abc"));
        assert_ne!(Hash::compute_from(b"abc"), Hash::compute_from(b"abd"));
    }

    #[test]
    fn serde_human_readable_round_trip() {
        let hash = Hash::compute_from(b"serde");
        let json = serde_json::to_string(&hash).unwrap();
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
