//! Sign/verify dispatcher.
//!
//! Computes the signature hash of an input and hands it to the ECDSA or
//! Schnorr primitive. Digests are passed to the primitive little-endian
//! (byte-reversed). The resulting [`Signature`] carries its scope, so a
//! verifier does not need it supplied separately.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kaspacore_primitives::ec::{PrivateKey, PublicKey};
use kaspacore_primitives::ecdsa::{self, Endianness};
use kaspacore_primitives::schnorr::{self, SchnorrSignature};
use kaspacore_script::Script;

use crate::config::SighashConfig;
use crate::sighash::{compute_signature_hash, SignatureScope};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Byte order in which digests reach the curve primitives.
const DIGEST_ENDIANNESS: Endianness = Endianness::Little;

/// Signature algorithm used to sign a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningScheme {
    #[default]
    Ecdsa,
    Schnorr,
}

impl FromStr for SigningScheme {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ecdsa" => Ok(SigningScheme::Ecdsa),
            "schnorr" => Ok(SigningScheme::Schnorr),
            other => Err(TransactionError::UnknownSigningScheme(other.to_string())),
        }
    }
}

impl fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningScheme::Ecdsa => f.write_str("ecdsa"),
            SigningScheme::Schnorr => f.write_str("schnorr"),
        }
    }
}

/// Raw signature of either scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureValue {
    Ecdsa(kaspacore_primitives::ec::Signature),
    Schnorr(SchnorrSignature),
}

/// A signature together with the scope it was produced for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub value: SignatureValue,
    pub scope: Option<SignatureScope>,
}

impl Signature {
    /// The scheme that produced this signature.
    pub fn scheme(&self) -> SigningScheme {
        match self.value {
            SignatureValue::Ecdsa(_) => SigningScheme::Ecdsa,
            SignatureValue::Schnorr(_) => SigningScheme::Schnorr,
        }
    }

    /// Encode as pushed in a signature script: the DER (ECDSA) or 64-byte
    /// (Schnorr) signature followed by the scope's low byte.
    pub fn to_script_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let scope = self.scope.ok_or(TransactionError::MissingScopeMetadata)?;
        let mut out = match &self.value {
            SignatureValue::Ecdsa(sig) => sig.to_der(),
            SignatureValue::Schnorr(sig) => sig.to_bytes().to_vec(),
        };
        out.push(scope.to_byte());
        Ok(out)
    }

    /// Decode the form produced by [`Signature::to_script_bytes`].
    pub fn from_script_bytes(bytes: &[u8], scheme: SigningScheme) -> Result<Self, TransactionError> {
        let (scope, body) = bytes
            .split_last()
            .ok_or_else(|| TransactionError::InvalidSignature("empty signature".to_string()))?;
        let value = match scheme {
            SigningScheme::Ecdsa => {
                SignatureValue::Ecdsa(kaspacore_primitives::ec::Signature::from_der(body)?)
            }
            SigningScheme::Schnorr => SignatureValue::Schnorr(SchnorrSignature::from_bytes(body)?),
        };
        Ok(Signature {
            value,
            scope: Some(SignatureScope(u32::from(*scope))),
        })
    }
}

/// Sign one input of a transaction.
///
/// # Arguments
/// * `tx`          - The transaction being signed.
/// * `private_key` - The signing key.
/// * `scope`       - Signature scope, attached to the result.
/// * `input_index` - Index of the input being signed.
/// * `subscript`   - Script the signature commits to.
/// * `spent_value` - Value of the spent output, when known.
/// * `config`      - Signature-hash generation and flags.
/// * `scheme`      - ECDSA or Schnorr.
#[allow(clippy::too_many_arguments)]
pub fn sign(
    tx: &Transaction,
    private_key: &PrivateKey,
    scope: SignatureScope,
    input_index: usize,
    subscript: &Script,
    spent_value: Option<u64>,
    config: &SighashConfig,
    scheme: SigningScheme,
) -> Result<Signature, TransactionError> {
    let digest =
        compute_signature_hash(tx, scope, input_index, subscript, spent_value, config, None)?;

    let value = match scheme {
        SigningScheme::Ecdsa => {
            SignatureValue::Ecdsa(ecdsa::sign(&digest, private_key, DIGEST_ENDIANNESS)?)
        }
        SigningScheme::Schnorr => {
            SignatureValue::Schnorr(schnorr::sign(&digest, private_key, DIGEST_ENDIANNESS)?)
        }
    };
    debug!(input_index, %scheme, scope = scope.value(), "signed input");

    Ok(Signature {
        value,
        scope: Some(scope),
    })
}

/// Verify a signature over one input of a transaction.
///
/// # Returns
/// `Ok(true)` when valid and `Ok(false)` on a mismatch. Errors are
/// reserved for a missing scope, a scheme mismatch, and malformed keys or
/// signatures.
#[allow(clippy::too_many_arguments)]
pub fn verify(
    tx: &Transaction,
    signature: &Signature,
    public_key: &PublicKey,
    input_index: usize,
    subscript: &Script,
    spent_value: Option<u64>,
    config: &SighashConfig,
    scheme: SigningScheme,
) -> Result<bool, TransactionError> {
    let scope = signature.scope.ok_or(TransactionError::MissingScopeMetadata)?;
    if signature.scheme() != scheme {
        return Err(TransactionError::InvalidSignatureScheme);
    }

    let digest =
        compute_signature_hash(tx, scope, input_index, subscript, spent_value, config, None)?;

    let valid = match &signature.value {
        SignatureValue::Ecdsa(sig) => ecdsa::verify(&digest, sig, public_key, DIGEST_ENDIANNESS),
        SignatureValue::Schnorr(sig) => {
            schnorr::verify(&digest, sig, public_key, DIGEST_ENDIANNESS)?
        }
    };
    debug!(input_index, %scheme, valid, "verified input signature");
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("ecdsa".parse::<SigningScheme>().unwrap(), SigningScheme::Ecdsa);
        assert_eq!("schnorr".parse::<SigningScheme>().unwrap(), SigningScheme::Schnorr);
        assert!(matches!(
            "rsa".parse::<SigningScheme>(),
            Err(TransactionError::UnknownSigningScheme(s)) if s == "rsa"
        ));
        assert_eq!(SigningScheme::default(), SigningScheme::Ecdsa);
        assert_eq!(SigningScheme::Schnorr.to_string(), "schnorr");
    }

    #[test]
    fn test_script_bytes_round_trip() {
        let key = PrivateKey::new();
        let digest = kaspacore_primitives::hash::sha256(b"script bytes");
        let sig = Signature {
            value: SignatureValue::Schnorr(schnorr::sign(&digest, &key, Endianness::Little).unwrap()),
            scope: Some(SignatureScope::ALL),
        };
        let bytes = sig.to_script_bytes().unwrap();
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[64], 0x01);
        assert_eq!(Signature::from_script_bytes(&bytes, SigningScheme::Schnorr).unwrap(), sig);

        let ecdsa_sig = Signature {
            value: SignatureValue::Ecdsa(ecdsa::sign(&digest, &key, Endianness::Little).unwrap()),
            scope: Some(SignatureScope::ALL_FORKID),
        };
        let bytes = ecdsa_sig.to_script_bytes().unwrap();
        assert_eq!(*bytes.last().unwrap(), 0x41);
        assert_eq!(
            Signature::from_script_bytes(&bytes, SigningScheme::Ecdsa).unwrap(),
            ecdsa_sig
        );
    }

    #[test]
    fn test_script_bytes_need_scope() {
        let key = PrivateKey::new();
        let digest = kaspacore_primitives::hash::sha256(b"no scope");
        let sig = Signature {
            value: SignatureValue::Ecdsa(ecdsa::sign(&digest, &key, Endianness::Big).unwrap()),
            scope: None,
        };
        assert!(matches!(
            sig.to_script_bytes(),
            Err(TransactionError::MissingScopeMetadata)
        ));
        assert!(Signature::from_script_bytes(&[], SigningScheme::Ecdsa).is_err());
    }
}
