//! Hash function primitives for kaspacore.
//!
//! Provides SHA-256, double SHA-256, Hash160, and the keyed BLAKE2b-256
//! "transaction signing hash" used by the cached signature-hash
//! generation. The signing hasher is streaming and implements
//! [`ByteSink`], so serialized fields can be written straight into it.

use blake2b_simd::{Params, State};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::util::ByteSink;

/// Size of every digest produced by this module except Hash160.
pub const HASH_SIZE: usize = 32;

/// Key used for the BLAKE2b transaction signing hash.
pub const TRANSACTION_SIGNING_HASH_KEY: &[u8] = b"TransactionSigningHash";

/// The all-zero hash, used where a signature scope excludes a field.
pub const ZERO_HASH: [u8; HASH_SIZE] = [0u8; HASH_SIZE];

/// Compute SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute double SHA-256 (SHA-256d) hash of the input data.
///
/// Computes SHA-256(SHA-256(data)). This is the digest of the legacy
/// signature-hash generation.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Hash160: RIPEMD-160(SHA-256(data)).
///
/// Used for pay-to-public-key-hash locking scripts.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Streaming BLAKE2b-256 keyed with [`TRANSACTION_SIGNING_HASH_KEY`].
///
/// # Example
/// ```
/// use kaspacore_primitives::hash::{transaction_signing_hash, TransactionSigningHasher};
/// use kaspacore_primitives::util::ByteSink;
///
/// let mut hasher = TransactionSigningHasher::new();
/// hasher.write_u16_le(0);
/// hasher.write_bytes(b"abc");
/// assert_eq!(hasher.finalize(), transaction_signing_hash(&[0, 0, b'a', b'b', b'c']));
/// ```
#[derive(Clone)]
pub struct TransactionSigningHasher {
    state: State,
}

impl TransactionSigningHasher {
    /// Create a hasher with the signing-hash key applied.
    pub fn new() -> Self {
        let state = Params::new()
            .hash_length(HASH_SIZE)
            .key(TRANSACTION_SIGNING_HASH_KEY)
            .to_state();
        TransactionSigningHasher { state }
    }

    /// Feed more data into the hash.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.state.update(data);
        self
    }

    /// Consume the hasher and return the 32-byte digest.
    pub fn finalize(self) -> [u8; HASH_SIZE] {
        let mut out = [0u8; HASH_SIZE];
        out.copy_from_slice(self.state.finalize().as_bytes());
        out
    }
}

impl Default for TransactionSigningHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSink for TransactionSigningHasher {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }
}

/// One-shot keyed BLAKE2b-256 transaction signing hash.
pub fn transaction_signing_hash(data: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = TransactionSigningHasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_DATA_2: &[u8] = b"this is the data I want to hash";

    #[test]
    fn test_sha256d_empty_string() {
        assert_eq!(
            hex::encode(sha256d(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_sha256d_string() {
        assert_eq!(
            hex::encode(sha256d(TEST_DATA_2)),
            "2209ddda5914a3fbad507ff2284c4b6e559c18a669f9fc3ad3b5826a2a999d58"
        );
    }

    #[test]
    fn test_sha256_empty_string() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash160_string() {
        assert_eq!(
            hex::encode(hash160(TEST_DATA_2)),
            "e7fb13ef86fef4203f042fbfc2703fa628301e90"
        );
    }

    #[test]
    fn test_signing_hash_matches_blake2b_keyed() {
        let expected = Params::new()
            .hash_length(32)
            .key(b"TransactionSigningHash")
            .hash(TEST_DATA_2);
        assert_eq!(
            transaction_signing_hash(TEST_DATA_2).as_slice(),
            expected.as_bytes()
        );
    }

    #[test]
    fn test_signing_hash_is_keyed() {
        let unkeyed = Params::new().hash_length(32).hash(TEST_DATA_2);
        assert_ne!(
            transaction_signing_hash(TEST_DATA_2).as_slice(),
            unkeyed.as_bytes()
        );
    }

    #[test]
    fn test_signing_hasher_streaming_equals_one_shot() {
        let mut hasher = TransactionSigningHasher::new();
        hasher.update(&TEST_DATA_2[..10]).update(&TEST_DATA_2[10..]);
        assert_eq!(hasher.finalize(), transaction_signing_hash(TEST_DATA_2));
    }

    #[test]
    fn test_signing_hasher_as_byte_sink() {
        let mut hasher = TransactionSigningHasher::new();
        hasher.write_u64_le(7);
        hasher.write_var_bytes(b"ab");

        let mut expected = Vec::new();
        expected.extend_from_slice(&7u64.to_le_bytes());
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(b"ab");
        assert_eq!(hasher.finalize(), transaction_signing_hash(&expected));
    }
}
