//! BIP-340 Schnorr signatures over secp256k1.
//!
//! Keys are the same `PrivateKey`/`PublicKey` used for ECDSA. Verification
//! only looks at the x coordinate of the public key.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::schnorr;
use zeroize::Zeroizing;

use crate::ec::{PrivateKey, PublicKey};
use crate::ecdsa::Endianness;
use crate::PrimitivesError;

/// Length of a Schnorr signature in bytes.
pub const SCHNORR_SIGNATURE_LEN: usize = 64;

/// A 64-byte BIP-340 Schnorr signature (`R.x || s`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchnorrSignature([u8; SCHNORR_SIGNATURE_LEN]);

impl SchnorrSignature {
    /// Parse a 64-byte signature.
    ///
    /// Fails with `InvalidSignature` on a wrong length or when the `s`
    /// half is not a valid scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let sig = schnorr::Signature::try_from(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(SchnorrSignature(sig.to_bytes()))
    }

    /// The raw 64 bytes.
    pub fn to_bytes(&self) -> [u8; SCHNORR_SIGNATURE_LEN] {
        self.0
    }

    /// Lowercase hex of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Sign a 32-byte digest with BIP-340 Schnorr.
///
/// # Arguments
/// * `digest` - The digest to sign.
/// * `key` - The signing key. Its public key may have odd Y.
/// * `endian` - Byte order the primitive reads `digest` in.
pub fn sign(
    digest: &[u8; 32],
    key: &PrivateKey,
    endian: Endianness,
) -> Result<SchnorrSignature, PrimitivesError> {
    let secret = Zeroizing::new(key.to_bytes());
    let signing_key = schnorr::SigningKey::from_bytes(&secret[..])
        .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
    let sig: schnorr::Signature = signing_key
        .sign_prehash(&endian.apply(digest))
        .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
    Ok(SchnorrSignature(sig.to_bytes()))
}

/// Verify a Schnorr signature over a 32-byte digest.
///
/// # Returns
/// `Ok(true)` when valid, `Ok(false)` on mismatch, and an error only when
/// the signature or key bytes are malformed.
pub fn verify(
    digest: &[u8; 32],
    sig: &SchnorrSignature,
    key: &PublicKey,
    endian: Endianness,
) -> Result<bool, PrimitivesError> {
    let verifying_key = schnorr::VerifyingKey::from_bytes(&key.x_only())
        .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
    let sig = schnorr::Signature::try_from(sig.0.as_slice())
        .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
    Ok(verifying_key
        .verify_prehash(&endian.apply(digest), &sig)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn test_sign_verify() {
        let key = PrivateKey::new();
        let digest = sha256(b"schnorr");

        let sig = sign(&digest, &key, Endianness::Little).unwrap();
        assert!(verify(&digest, &sig, &key.pub_key(), Endianness::Little).unwrap());
        assert!(!verify(&digest, &sig, &key.pub_key(), Endianness::Big).unwrap());
    }

    #[test]
    fn test_wrong_key_or_digest() {
        let key = PrivateKey::new();
        let digest = sha256(b"schnorr");
        let sig = sign(&digest, &key, Endianness::Big).unwrap();

        let other = PrivateKey::new();
        assert!(!verify(&digest, &sig, &other.pub_key(), Endianness::Big).unwrap());
        assert!(!verify(&sha256(b"other"), &sig, &key.pub_key(), Endianness::Big).unwrap());
    }

    #[test]
    fn test_signature_bytes_round_trip() {
        let key = PrivateKey::new();
        let sig = sign(&sha256(b"x"), &key, Endianness::Big).unwrap();
        let parsed = SchnorrSignature::from_bytes(&sig.to_bytes()).unwrap();
        assert_eq!(parsed, sig);
        assert_eq!(sig.to_hex().len(), 128);
        assert!(SchnorrSignature::from_bytes(&[0u8; 63]).is_err());
    }

    #[test]
    fn test_keys_of_either_parity_verify() {
        for _ in 0..16 {
            let key = PrivateKey::new();
            let digest = sha256(&key.pub_key().to_compressed());
            let sig = sign(&digest, &key, Endianness::Little).unwrap();
            assert!(verify(&digest, &sig, &key.pub_key(), Endianness::Little).unwrap());
        }
    }
}
