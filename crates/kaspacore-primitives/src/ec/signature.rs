//! ECDSA signature with DER serialization and RFC6979 deterministic nonces.
//!
//! Signatures are kept low-S normalized at all times, so the DER form is
//! canonical and round-trips byte for byte.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of the fixed-width `r || s` encoding.
pub const SIGNATURE_BYTES_LEN: usize = 64;

/// An ECDSA signature over secp256k1.
///
/// Wraps the k256 signature. Every constructor normalizes S to the lower
/// half of the curve order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: ecdsa::Signature,
}

impl Signature {
    /// Create a signature from raw R and S 32-byte big-endian values.
    ///
    /// # Returns
    /// `Ok(Signature)` with S normalized, or `InvalidSignature` if either
    /// component is zero or not below the curve order.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Result<Self, PrimitivesError> {
        let sig =
            ecdsa::Signature::from_scalars(k256::FieldBytes::from(r), k256::FieldBytes::from(s))
                .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Self::normalized(sig))
    }

    /// The R component (32 bytes, big-endian).
    pub fn r(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.to_bytes()[..32]);
        out
    }

    /// The S component (32 bytes, big-endian, low-S).
    pub fn s(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.to_bytes()[32..]);
        out
    }

    /// Parse a strict DER-encoded ECDSA signature.
    ///
    /// Expected format: 0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>
    ///
    /// # Arguments
    /// * `bytes` - DER-encoded signature bytes.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if the DER encoding is malformed.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: empty".to_string(),
            ));
        }
        let sig = ecdsa::Signature::from_der(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(format!("malformed DER: {}", e)))?;
        Ok(Self::normalized(sig))
    }

    /// Serialize the signature in DER format.
    pub fn to_der(&self) -> Vec<u8> {
        self.inner.to_der().as_bytes().to_vec()
    }

    /// Parse the fixed-width 64-byte `r || s` encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_BYTES_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_BYTES_LEN,
                bytes.len()
            )));
        }
        let sig = ecdsa::Signature::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Self::normalized(sig))
    }

    /// Serialize as the fixed-width 64-byte `r || s` encoding.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        let mut out = [0u8; SIGNATURE_BYTES_LEN];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Sign a digest using RFC6979 deterministic nonces.
    ///
    /// # Arguments
    /// * `hash` - The digest to sign (32 bytes), used in the order given.
    /// * `priv_key` - The private key to sign with.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if signing fails.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let sig: ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Self::normalized(sig))
    }

    /// Verify this signature against a digest and public key.
    ///
    /// # Returns
    /// `true` if the signature is valid, `false` otherwise.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        pub_key
            .verifying_key()
            .verify_prehash(hash, &self.inner)
            .is_ok()
    }

    fn normalized(sig: ecdsa::Signature) -> Self {
        Signature {
            inner: sig.normalize_s().unwrap_or(sig),
        }
    }
}
