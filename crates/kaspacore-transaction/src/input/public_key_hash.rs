//! Input spending a pay-to-public-key-hash output.

use tracing::debug;

use kaspacore_primitives::ec::PrivateKey;
use kaspacore_script::Script;

use crate::config::SighashConfig;
use crate::input::{Input, InputSigner, TransactionSignature};
use crate::sighash::SignatureScope;
use crate::signing::{self, SigningScheme};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Input whose spent output is `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
///
/// Signed, its script is `<signature || scope byte> <compressed public key>`.
#[derive(Clone, Debug)]
pub struct PublicKeyHashInput {
    input: Input,
    public_key_hash: [u8; 20],
}

impl PublicKeyHashInput {
    /// Wrap an input whose spent output is a P2PKH locking script.
    pub fn new(input: Input) -> Result<Self, TransactionError> {
        let output = input.spent_output.as_ref().ok_or_else(|| {
            TransactionError::UnsupportedInputKind(
                "public key hash input needs its spent output".to_string(),
            )
        })?;
        let public_key_hash = output.script.public_key_hash()?;
        Ok(PublicKeyHashInput {
            input,
            public_key_hash,
        })
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn into_input(self) -> Input {
        self.input
    }
}

impl InputSigner for PublicKeyHashInput {
    fn get_signatures(
        &self,
        tx: &Transaction,
        private_key: &PrivateKey,
        input_index: usize,
        scope: SignatureScope,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<Vec<TransactionSignature>, TransactionError> {
        let public_key = private_key.pub_key();
        if public_key.hash160() != self.public_key_hash {
            return Ok(Vec::new());
        }
        let output = self
            .input
            .spent_output
            .as_ref()
            .ok_or(TransactionError::MissingSpentOutputContext(input_index))?;

        let signature = signing::sign(
            tx,
            private_key,
            scope,
            input_index,
            &output.script,
            Some(output.value),
            config,
            scheme,
        )?;

        Ok(vec![TransactionSignature {
            public_key,
            previous_tx_id: self.input.previous_tx_id,
            output_index: self.input.output_index,
            input_index,
            signature,
            scope,
        }])
    }

    fn add_signature(
        &mut self,
        tx: &Transaction,
        signature: TransactionSignature,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<(), TransactionError> {
        if !self.input.is_valid_signature(tx, &signature, config, scheme)? {
            return Err(TransactionError::InvalidSignature(format!(
                "signature does not verify for input {}",
                signature.input_index
            )));
        }
        let script = Script::p2pkh_unlock(
            &signature.scoped_signature().to_script_bytes()?,
            &signature.public_key.to_compressed(),
        )?;
        debug!(input_index = signature.input_index, "added public key hash signature");
        self.input.set_script(script);
        Ok(())
    }

    fn clear_signatures(&mut self) -> Result<(), TransactionError> {
        self.input.set_script(Script::new());
        Ok(())
    }

    fn is_fully_signed(&self) -> Result<bool, TransactionError> {
        if self.input.script.is_empty() {
            return Ok(false);
        }
        let chunks = self.input.script.chunks()?;
        Ok(chunks.len() == 2 && chunks.iter().all(|c| c.data.is_some()))
    }
}
