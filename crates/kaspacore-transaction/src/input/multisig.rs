//! Input spending a bare m-of-n multisig output.

use tracing::debug;

use kaspacore_primitives::ec::{PrivateKey, PublicKey};
use kaspacore_script::opcodes::OP_0;
use kaspacore_script::Script;

use crate::config::SighashConfig;
use crate::input::{Input, InputSigner, TransactionSignature};
use crate::sighash::SignatureScope;
use crate::signing::{self, Signature, SigningScheme};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Input whose spent output is `OP_m <key>... OP_n OP_CHECKMULTISIG`.
///
/// Signatures are kept in public-key order; the script is rebuilt as
/// `OP_0 <sig>...` after every change.
#[derive(Clone, Debug)]
pub struct MultiSigInput {
    input: Input,
    threshold: usize,
    public_keys: Vec<PublicKey>,
    signatures: Vec<Option<TransactionSignature>>,
}

impl MultiSigInput {
    /// Wrap an input whose spent output is a bare multisig locking script.
    pub fn new(input: Input) -> Result<Self, TransactionError> {
        let output = input.spent_output.as_ref().ok_or_else(|| {
            TransactionError::UnsupportedInputKind(
                "multisig input needs its spent output".to_string(),
            )
        })?;
        let (threshold, keys) = output.script.multisig_params()?;
        let public_keys = keys
            .iter()
            .map(|k| PublicKey::from_bytes(k))
            .collect::<Result<Vec<_>, _>>()?;
        let signatures = vec![None; public_keys.len()];
        Ok(MultiSigInput {
            input,
            threshold,
            public_keys,
            signatures,
        })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    pub fn count_signatures(&self) -> usize {
        self.signatures.iter().filter(|s| s.is_some()).count()
    }

    pub fn count_missing_signatures(&self) -> usize {
        self.threshold.saturating_sub(self.count_signatures())
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn into_input(self) -> Input {
        self.input
    }

    /// Re-attach signatures already present in the signature script.
    ///
    /// Each push after the leading OP_0 is matched to the first unsigned
    /// key it verifies against. Pushes that do not parse or verify are
    /// dropped on the next script rebuild.
    pub fn recover_signatures(
        &mut self,
        tx: &Transaction,
        input_index: usize,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<(), TransactionError> {
        let chunks = self.input.script.chunks()?;
        let pushes = match chunks.split_first() {
            Some((dummy, rest)) if dummy.op == OP_0 => rest,
            _ => return Ok(()),
        };
        for data in pushes.iter().filter_map(|c| c.data.as_ref()) {
            let signature = match Signature::from_script_bytes(data, scheme) {
                Ok(sig) => sig,
                Err(_) => continue,
            };
            let scope = match signature.scope {
                Some(scope) => scope,
                None => continue,
            };
            for slot in 0..self.public_keys.len() {
                if self.signatures[slot].is_some() {
                    continue;
                }
                let candidate = TransactionSignature {
                    public_key: self.public_keys[slot].clone(),
                    previous_tx_id: self.input.previous_tx_id,
                    output_index: self.input.output_index,
                    input_index,
                    signature: signature.clone(),
                    scope,
                };
                if self.input.is_valid_signature(tx, &candidate, config, scheme)? {
                    self.signatures[slot] = Some(candidate);
                    break;
                }
            }
        }
        debug!(input_index, recovered = self.count_signatures(), "recovered multisig signatures");
        Ok(())
    }

    fn rebuild_script(&mut self) -> Result<(), TransactionError> {
        let pushes = self
            .signatures
            .iter()
            .flatten()
            .map(|s| s.scoped_signature().to_script_bytes())
            .collect::<Result<Vec<_>, _>>()?;
        self.input.set_script(Script::multisig_unlock(&pushes)?);
        Ok(())
    }
}

impl InputSigner for MultiSigInput {
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
        let output = self
            .input
            .spent_output
            .as_ref()
            .ok_or(TransactionError::MissingSpentOutputContext(input_index))?;

        let mut out = Vec::new();
        for key in self.public_keys.iter().filter(|k| **k == public_key) {
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
            out.push(TransactionSignature {
                public_key: key.clone(),
                previous_tx_id: self.input.previous_tx_id,
                output_index: self.input.output_index,
                input_index,
                signature,
                scope,
            });
        }
        Ok(out)
    }

    fn add_signature(
        &mut self,
        tx: &Transaction,
        signature: TransactionSignature,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<(), TransactionError> {
        // a key listed more than once fills its slots in order
        let mut matching = self
            .public_keys
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == signature.public_key)
            .map(|(slot, _)| slot);
        let first = matching.next().ok_or_else(|| {
            TransactionError::InvalidSignature(
                "public key is not part of the multisig set".to_string(),
            )
        })?;
        let slot = std::iter::once(first)
            .chain(matching)
            .find(|&slot| self.signatures[slot].is_none())
            .unwrap_or(first);
        if !self.input.is_valid_signature(tx, &signature, config, scheme)? {
            return Err(TransactionError::InvalidSignature(format!(
                "signature does not verify for input {}",
                signature.input_index
            )));
        }
        debug!(
            input_index = signature.input_index,
            slot,
            "added multisig signature"
        );
        self.signatures[slot] = Some(signature);
        self.rebuild_script()
    }

    fn clear_signatures(&mut self) -> Result<(), TransactionError> {
        self.signatures.iter_mut().for_each(|s| *s = None);
        self.input.set_script(Script::new());
        Ok(())
    }

    fn is_fully_signed(&self) -> Result<bool, TransactionError> {
        Ok(self.count_missing_signatures() == 0)
    }
}
