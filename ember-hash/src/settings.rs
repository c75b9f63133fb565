// Copyright (c) 2023 EMBER LABS <info@emberlabs.io>

/// Size of the underlying digest, in bytes
pub const HASH_SIZE_BYTES: usize = 32;
