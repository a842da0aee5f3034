//! secp256k1 private key.
//!
//! Wraps the k256 signing key. Exposes raw and hex serialization, the
//! matching public key and deterministic ECDSA signing over a prehash.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// A secp256k1 private key.
///
/// The scalar lives in k256's `SigningKey`, which zeroizes itself on drop.
/// Serialized copies made here are wrapped in `Zeroizing`.
///
/// The same scalar signs both ECDSA and Schnorr digests; see
/// [`crate::ecdsa`] and [`crate::schnorr`].
#[derive(Clone, Debug)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte big-endian scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes are a valid non-zero scalar below the
    /// curve order, otherwise `InvalidPrivateKey`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a 64-character hexadecimal string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());
        hex::encode(&*bytes)
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest with RFC6979 deterministic nonces.
    ///
    /// The digest is used as-is. Byte-order handling belongs to
    /// [`crate::ecdsa::sign`].
    ///
    /// # Returns
    /// A low-S normalized `Signature`, or an error if signing fails.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// Access the underlying k256 `SigningKey`.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        Zeroizing::new(self.to_bytes()) == Zeroizing::new(other.to_bytes())
    }
}

impl Eq for PrivateKey {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priv_keys() {
        let key_bytes: [u8; 32] = [
            0xea, 0xf0, 0x2c, 0xa3, 0x48, 0xc5, 0x24, 0xe6, 0x39, 0x26, 0x55, 0xba, 0x4d, 0x29,
            0x60, 0x3c, 0xd1, 0xa7, 0x34, 0x7d, 0x9d, 0x65, 0xcf, 0xe9, 0x3c, 0xe1, 0xeb, 0xff,
            0xdc, 0xa2, 0x26, 0x94,
        ];

        let priv_key = PrivateKey::from_bytes(&key_bytes).unwrap();
        let pub_key = priv_key.pub_key();

        let uncompressed = pub_key.to_uncompressed();
        let parsed = PublicKey::from_bytes(&uncompressed).unwrap();
        assert_eq!(parsed, pub_key);

        let hash = crate::hash::sha256(b"kaspacore");
        let sig = priv_key.sign(&hash).unwrap();
        assert!(pub_key.verify(&hash, &sig));

        assert_eq!(priv_key.to_bytes(), key_bytes);
    }

    #[test]
    fn test_private_key_hex_round_trip() {
        let pk = PrivateKey::new();
        let deserialized = PrivateKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, deserialized);
        assert_eq!(PrivateKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
    }

    #[test]
    fn test_scalar_is_zeroized_on_drop() {
        fn zeroize_on_drop<T: zeroize::ZeroizeOnDrop>(_: &T) {}
        let key = PrivateKey::new();
        zeroize_on_drop(key.signing_key());
    }

    #[test]
    fn test_private_key_rejects_bad_input() {
        assert!(PrivateKey::from_hex("").is_err());
        assert!(PrivateKey::from_hex("zz").is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        // zero scalar
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        // curve order N
        let n = hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141")
            .unwrap();
        assert!(PrivateKey::from_bytes(&n).is_err());
    }
}
