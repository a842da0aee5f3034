//! Signing capability shared by the input kinds.

use kaspacore_primitives::ec::{PrivateKey, PublicKey};

use crate::config::SighashConfig;
use crate::input::Input;
use crate::sighash::SignatureScope;
use crate::signing::{Signature, SigningScheme};
use crate::transaction::Transaction;
use crate::TransactionError;

/// A signature collected for one input, with what is needed to verify it.
#[derive(Clone, Debug)]
pub struct TransactionSignature {
    pub public_key: PublicKey,
    pub previous_tx_id: [u8; 32],
    pub output_index: u32,
    pub input_index: usize,
    pub signature: Signature,
    pub scope: SignatureScope,
}

impl TransactionSignature {
    /// The signature with `scope` attached.
    pub fn scoped_signature(&self) -> Signature {
        Signature {
            value: self.signature.value.clone(),
            scope: Some(self.scope),
        }
    }
}

/// Operations an input kind supports to become signed.
///
/// Kinds are chosen by the locking script of the spent output; see
/// [`crate::input::AnyInput`].
pub trait InputSigner {
    /// Produce every signature `private_key` can contribute to this input.
    ///
    /// Returns an empty vector when the key is not involved.
    fn get_signatures(
        &self,
        tx: &Transaction,
        private_key: &PrivateKey,
        input_index: usize,
        scope: SignatureScope,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<Vec<TransactionSignature>, TransactionError>;

    /// Validate `signature` and fold it into the signature script.
    fn add_signature(
        &mut self,
        tx: &Transaction,
        signature: TransactionSignature,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<(), TransactionError>;

    /// Drop every collected signature and empty the signature script.
    fn clear_signatures(&mut self) -> Result<(), TransactionError>;

    /// True once enough signatures are present to spend the output.
    fn is_fully_signed(&self) -> Result<bool, TransactionError>;
}

fn unsupported(op: &str) -> TransactionError {
    TransactionError::UnsupportedInputKind(format!(
        "{}: only pay-to-public-key-hash and multisig inputs can be signed",
        op
    ))
}

impl InputSigner for Input {
    fn get_signatures(
        &self,
        _tx: &Transaction,
        _private_key: &PrivateKey,
        _input_index: usize,
        _scope: SignatureScope,
        _config: &SighashConfig,
        _scheme: SigningScheme,
    ) -> Result<Vec<TransactionSignature>, TransactionError> {
        Err(unsupported("get_signatures"))
    }

    fn add_signature(
        &mut self,
        _tx: &Transaction,
        _signature: TransactionSignature,
        _config: &SighashConfig,
        _scheme: SigningScheme,
    ) -> Result<(), TransactionError> {
        Err(unsupported("add_signature"))
    }

    fn clear_signatures(&mut self) -> Result<(), TransactionError> {
        Err(unsupported("clear_signatures"))
    }

    fn is_fully_signed(&self) -> Result<bool, TransactionError> {
        Err(unsupported("is_fully_signed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_tx;

    #[test]
    fn test_base_input_is_unsupported() {
        let tx = sample_tx(1, 1);
        let mut input = tx.inputs[0].clone();
        let key = PrivateKey::new();
        let config = SighashConfig::default();

        let err = input
            .get_signatures(&tx, &key, 0, SignatureScope::ALL, &config, SigningScheme::Ecdsa)
            .unwrap_err();
        assert!(matches!(err, TransactionError::UnsupportedInputKind(_)));
        assert!(matches!(
            input.is_fully_signed(),
            Err(TransactionError::UnsupportedInputKind(_))
        ));
        assert!(matches!(
            input.clear_signatures(),
            Err(TransactionError::UnsupportedInputKind(_))
        ));
    }
}
