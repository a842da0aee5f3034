use tracing::trace;

use kaspacore_primitives::ec::PrivateKey;

use crate::config::SighashConfig;
use crate::input::{Input, InputSigner, MultiSigInput, PublicKeyHashInput, TransactionSignature};
use crate::sighash::SignatureScope;
use crate::signing::SigningScheme;
use crate::transaction::Transaction;
use crate::TransactionError;

/// An input tagged with its kind, chosen from the spent output's script.
#[derive(Clone, Debug)]
pub enum AnyInput {
    PublicKeyHash(PublicKeyHashInput),
    MultiSig(MultiSigInput),
    /// Spent output unknown or of a template that cannot be signed here.
    Unsupported(Input),
}

impl AnyInput {
    /// Classify `input` by the locking script of its spent output.
    pub fn classify(input: Input) -> Result<Self, TransactionError> {
        let (p2pkh, multisig) = match &input.spent_output {
            Some(output) => (
                output.script.is_public_key_hash_out(),
                output.script.is_multisig_out(),
            ),
            None => (false, false),
        };
        trace!(p2pkh, multisig, "classified input");
        if p2pkh {
            Ok(AnyInput::PublicKeyHash(PublicKeyHashInput::new(input)?))
        } else if multisig {
            Ok(AnyInput::MultiSig(MultiSigInput::new(input)?))
        } else {
            Ok(AnyInput::Unsupported(input))
        }
    }

    /// Load signatures already present in the script, for kinds that
    /// track them individually.
    pub fn recover_signatures(
        &mut self,
        tx: &Transaction,
        input_index: usize,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<(), TransactionError> {
        match self {
            AnyInput::MultiSig(i) => i.recover_signatures(tx, input_index, config, scheme),
            AnyInput::PublicKeyHash(_) | AnyInput::Unsupported(_) => Ok(()),
        }
    }

    pub fn input(&self) -> &Input {
        match self {
            AnyInput::PublicKeyHash(i) => i.input(),
            AnyInput::MultiSig(i) => i.input(),
            AnyInput::Unsupported(i) => i,
        }
    }

    pub fn into_input(self) -> Input {
        match self {
            AnyInput::PublicKeyHash(i) => i.into_input(),
            AnyInput::MultiSig(i) => i.into_input(),
            AnyInput::Unsupported(i) => i,
        }
    }

    fn signer(&self) -> &dyn InputSigner {
        match self {
            AnyInput::PublicKeyHash(i) => i,
            AnyInput::MultiSig(i) => i,
            AnyInput::Unsupported(i) => i,
        }
    }

    fn signer_mut(&mut self) -> &mut dyn InputSigner {
        match self {
            AnyInput::PublicKeyHash(i) => i,
            AnyInput::MultiSig(i) => i,
            AnyInput::Unsupported(i) => i,
        }
    }
}

impl InputSigner for AnyInput {
    fn get_signatures(
        &self,
        tx: &Transaction,
        private_key: &PrivateKey,
        input_index: usize,
        scope: SignatureScope,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<Vec<TransactionSignature>, TransactionError> {
        self.signer()
            .get_signatures(tx, private_key, input_index, scope, config, scheme)
    }

    fn add_signature(
        &mut self,
        tx: &Transaction,
        signature: TransactionSignature,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<(), TransactionError> {
        self.signer_mut().add_signature(tx, signature, config, scheme)
    }

    fn clear_signatures(&mut self) -> Result<(), TransactionError> {
        self.signer_mut().clear_signatures()
    }

    fn is_fully_signed(&self) -> Result<bool, TransactionError> {
        self.signer().is_fully_signed()
    }
}
