// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

//! Account addresses.

use crate::error::ModelsError;
use ember_hash::Hash;
use ember_signature::PublicKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Size of a serialized address, in bytes
pub const ADDRESS_SIZE_BYTES: usize = ember_hash::HASH_SIZE_BYTES;

const ADDRESS_PREFIX: char = 'A';

/// Fixed-width account identifier, derived from a public key
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Address(pub Hash);

impl Address {
    /// Computes the address associated with the given public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Address(Hash::compute_from(&public_key.to_bytes()))
    }

    /// Reference to the underlying bytes.
    pub fn to_bytes(&self) -> &[u8; ADDRESS_SIZE_BYTES] {
        self.0.to_bytes()
    }

    /// Build an address from raw bytes.
    pub fn from_bytes(data: &[u8; ADDRESS_SIZE_BYTES]) -> Self {
        Address(Hash::from_bytes(data))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", ADDRESS_PREFIX, self.0.to_bs58_check())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Address {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == ADDRESS_PREFIX => Hash::from_bs58_check(chars.as_str())
                .map(Address)
                .map_err(|err| ModelsError::AddressParseError(err.to_string())),
            _ => Err(ModelsError::AddressParseError(format!(
                "expected the {} prefix",
                ADDRESS_PREFIX
            ))),
        }
    }
}

impl ::serde::Serialize for Address {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_string())
        } else {
            self.0.serialize(s)
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for Address {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
        if d.is_human_readable() {
            let s = <String as ::serde::Deserialize>::deserialize(d)?;
            Address::from_str(&s).map_err(::serde::de::Error::custom)
        } else {
            Hash::deserialize(d).map(Address)
        }
    }
}
