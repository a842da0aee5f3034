//! ECDSA signing and verification over 32-byte digests.
//!
//! Signature-hash digests are produced in one byte order and consumed by
//! the curve primitive in another. These functions take the digest as
//! produced and an [`Endianness`] saying how the primitive should read it.

use crate::ec::{PrivateKey, PublicKey, Signature};
use crate::PrimitivesError;

/// How a digest is interpreted by the signing primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// The digest is passed to the primitive unchanged.
    #[default]
    Big,
    /// The digest is byte-reversed before it reaches the primitive.
    Little,
}

impl Endianness {
    /// Return the digest in the order the curve primitive consumes it.
    pub fn apply(self, digest: &[u8; 32]) -> [u8; 32] {
        let mut out = *digest;
        if self == Endianness::Little {
            out.reverse();
        }
        out
    }
}

/// Sign a 32-byte digest with ECDSA.
///
/// # Arguments
/// * `digest` - The digest to sign.
/// * `key` - The signing key.
/// * `endian` - Byte order the primitive reads `digest` in.
///
/// # Returns
/// A low-S normalized signature.
pub fn sign(
    digest: &[u8; 32],
    key: &PrivateKey,
    endian: Endianness,
) -> Result<Signature, PrimitivesError> {
    key.sign(&endian.apply(digest))
}

/// Verify an ECDSA signature over a 32-byte digest.
///
/// Returns `false` on mismatch. `endian` must match the value used to sign.
pub fn verify(digest: &[u8; 32], sig: &Signature, key: &PublicKey, endian: Endianness) -> bool {
    key.verify(&endian.apply(digest), sig)
}
