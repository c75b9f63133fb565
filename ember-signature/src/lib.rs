// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>
//! Signature management
#![warn(missing_docs)]

mod error;
mod signature_impl;

pub use error::{EmberSignatureError, SignatureResult};
pub use signature_impl::{
    KeyPair, PublicKey, Signature, PUBLIC_KEY_SIZE_BYTES, SECRET_KEY_SIZE_BYTES,
    SIGNATURE_SIZE_BYTES,
};
