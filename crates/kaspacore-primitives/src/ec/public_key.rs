//! secp256k1 public key.
//!
//! Supports compressed/uncompressed SEC1 serialization, the 32-byte
//! x-only form used by Schnorr verification, Hash160 and ECDSA
//! verification.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use std::fmt;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from SEC1 encoded bytes.
    ///
    /// Accepts both compressed (33-byte) and uncompressed (65-byte) formats.
    ///
    /// # Arguments
    /// * `bytes` - SEC1-encoded public key bytes.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or `InvalidPublicKey` if the bytes don't
    /// represent a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey bytes are empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    ///
    /// The first byte is 0x02 (even Y) or 0x03 (odd Y), followed by the
    /// 32-byte X coordinate.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key in uncompressed SEC1 format (65 bytes).
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// The 32-byte X coordinate, the BIP-340 x-only encoding of this key.
    pub fn x_only(&self) -> [u8; 32] {
        let compressed = self.to_compressed();
        let mut out = [0u8; 32];
        out.copy_from_slice(&compressed[1..]);
        out
    }

    /// Serialize the public key as a lowercase hex string (compressed format).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Hash160 of the compressed public key.
    ///
    /// This is the 20-byte payload of a pay-to-public-key-hash locking script.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify an ECDSA signature against a 32-byte digest.
    ///
    /// # Arguments
    /// * `hash` - The digest that was signed, in the order it was signed.
    /// * `sig` - The ECDSA signature to verify.
    ///
    /// # Returns
    /// `true` if the signature is valid for this digest and key.
    pub fn verify(&self, hash: &[u8], sig: &Signature) -> bool {
        sig.verify(hash, self)
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNCOMPRESSED_HEX: &str = "0411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3";

    #[test]
    fn test_pub_keys() {
        assert!(PublicKey::from_hex(UNCOMPRESSED_HEX).is_ok());

        // x coordinate changed: not on the curve
        let mut bad = hex::decode(UNCOMPRESSED_HEX).unwrap();
        bad[1] = 0x15;
        assert!(PublicKey::from_bytes(&bad).is_err());

        // wrong length
        assert!(PublicKey::from_bytes(&bad[..64]).is_err());
        assert!(PublicKey::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_compressed_round_trip() {
        let key = PublicKey::from_hex(UNCOMPRESSED_HEX).unwrap();
        let compressed = key.to_compressed();
        assert!(compressed[0] == 0x02 || compressed[0] == 0x03);

        let parsed = PublicKey::from_bytes(&compressed).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.to_uncompressed().to_vec(), hex::decode(UNCOMPRESSED_HEX).unwrap());
    }

    #[test]
    fn test_x_only_is_x_coordinate() {
        let key = PublicKey::from_hex(UNCOMPRESSED_HEX).unwrap();
        assert_eq!(key.x_only().to_vec(), hex::decode(&UNCOMPRESSED_HEX[2..66]).unwrap());
    }

    #[test]
    fn test_display() {
        let key = PublicKey::from_hex(UNCOMPRESSED_HEX).unwrap();
        assert_eq!(format!("{}", key), key.to_hex());
        assert_eq!(key.to_hex().len(), 66);
    }
}
