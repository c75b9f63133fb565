// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

use crate::error::{EmberSignatureError, SignatureResult};
use ed25519_dalek::{Signer, Verifier};
use ember_hash::Hash;
use rand::rngs::OsRng;
use std::convert::TryInto;
use std::str::FromStr;

/// Size of a serialized public key, in bytes
pub const PUBLIC_KEY_SIZE_BYTES: usize = 32;
/// Size of a serialized secret key, in bytes
pub const SECRET_KEY_SIZE_BYTES: usize = 32;
/// Size of a serialized signature, in bytes
pub const SIGNATURE_SIZE_BYTES: usize = 64;

/// An ed25519 keypair
#[derive(Clone)]
pub struct KeyPair(ed25519_dalek::SigningKey);

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "KeyPair({})", self.get_public_key())
    }
}

impl KeyPair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        KeyPair(ed25519_dalek::SigningKey::generate(&mut OsRng))
    }

    /// Build from raw secret key bytes.
    pub fn from_bytes(data: &[u8; SECRET_KEY_SIZE_BYTES]) -> Self {
        KeyPair(ed25519_dalek::SigningKey::from_bytes(data))
    }

    /// Raw secret key bytes.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_SIZE_BYTES] {
        self.0.to_bytes()
    }

    /// The public half of the keypair.
    pub fn get_public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Sign a digest with the secret half.
    pub fn sign(&self, hash: &Hash) -> SignatureResult<Signature> {
        Ok(Signature(self.0.sign(hash.to_bytes()).to_bytes()))
    }
}

/// Public key used to verify block and transaction signatures
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

impl PublicKey {
    /// Raw public key bytes.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE_BYTES] {
        self.0.to_bytes()
    }

    /// Build from raw public key bytes.
    pub fn from_bytes(data: &[u8; PUBLIC_KEY_SIZE_BYTES]) -> SignatureResult<Self> {
        ed25519_dalek::VerifyingKey::from_bytes(data)
            .map(PublicKey)
            .map_err(|err| EmberSignatureError::ParsingError(err.to_string()))
    }

    /// Check a signature over a digest.
    pub fn verify_signature(&self, hash: &Hash, signature: &Signature) -> SignatureResult<()> {
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.0
            .verify(hash.to_bytes(), &signature)
            .map_err(|err| EmberSignatureError::VerificationError(err.to_string()))
    }

    /// Deserialize from a `bs58` string with checksum.
    pub fn from_bs58_check(data: &str) -> SignatureResult<Self> {
        let decoded = bs58::decode(data)
            .with_check(None)
            .into_vec()
            .map_err(|err| EmberSignatureError::ParsingError(err.to_string()))?;
        let bytes: [u8; PUBLIC_KEY_SIZE_BYTES] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| EmberSignatureError::WrongLength(PUBLIC_KEY_SIZE_BYTES, decoded.len()))?;
        PublicKey::from_bytes(&bytes)
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            bs58::encode(self.to_bytes()).with_check().into_string()
        )
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for PublicKey {
    type Err = EmberSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicKey::from_bs58_check(s)
    }
}

impl ::serde::Serialize for PublicKey {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_string())
        } else {
            s.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for PublicKey {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<PublicKey, D::Error> {
        if d.is_human_readable() {
            struct Base58CheckVisitor;

            impl<'de> ::serde::de::Visitor<'de> for Base58CheckVisitor {
                type Value = PublicKey;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("an ASCII base58check string")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    PublicKey::from_bs58_check(v).map_err(E::custom)
                }
            }
            d.deserialize_str(Base58CheckVisitor)
        } else {
            struct BytesVisitor;

            impl<'de> ::serde::de::Visitor<'de> for BytesVisitor {
                type Value = PublicKey;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a bytestring")
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    let bytes: [u8; PUBLIC_KEY_SIZE_BYTES] = v.try_into().map_err(|_| {
                        E::invalid_length(v.len(), &"a public-key-sized bytestring")
                    })?;
                    PublicKey::from_bytes(&bytes).map_err(E::custom)
                }
            }
            d.deserialize_bytes(BytesVisitor)
        }
    }
}

/// An ed25519 signature
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_SIZE_BYTES]);

impl Signature {
    /// Raw signature bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE_BYTES] {
        self.0
    }

    /// Build from raw signature bytes.
    pub fn from_bytes(data: &[u8; SIGNATURE_SIZE_BYTES]) -> Self {
        Signature(*data)
    }

    /// Deserialize from a `bs58` string with checksum.
    pub fn from_bs58_check(data: &str) -> SignatureResult<Self> {
        let decoded = bs58::decode(data)
            .with_check(None)
            .into_vec()
            .map_err(|err| EmberSignatureError::ParsingError(err.to_string()))?;
        let bytes: [u8; SIGNATURE_SIZE_BYTES] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| EmberSignatureError::WrongLength(SIGNATURE_SIZE_BYTES, decoded.len()))?;
        Ok(Signature(bytes))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            bs58::encode(self.to_bytes()).with_check().into_string()
        )
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Signature {
    type Err = EmberSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signature::from_bs58_check(s)
    }
}

impl ::serde::Serialize for Signature {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_string())
        } else {
            s.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for Signature {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Signature, D::Error> {
        if d.is_human_readable() {
            struct Base58CheckVisitor;

            impl<'de> ::serde::de::Visitor<'de> for Base58CheckVisitor {
                type Value = Signature;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("an ASCII base58check string")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    Signature::from_bs58_check(v).map_err(E::custom)
                }
            }
            d.deserialize_str(Base58CheckVisitor)
        } else {
            struct BytesVisitor;

            impl<'de> ::serde::de::Visitor<'de> for BytesVisitor {
                type Value = Signature;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a bytestring")
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    let bytes: [u8; SIGNATURE_SIZE_BYTES] = v.try_into().map_err(|_| {
                        E::invalid_length(v.len(), &"a signature-sized bytestring")
                    })?;
                    Ok(Signature::from_bytes(&bytes))
                }
            }
            d.deserialize_bytes(BytesVisitor)
        }
    }
}
