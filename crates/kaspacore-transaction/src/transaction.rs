//! Transaction aggregate read by the signature-hash engine.
//!
//! Holds the version, inputs, outputs and lock time, with binary and hex
//! serialization, transaction ID computation, coinbase detection, and
//! per-input signing through the input kinds.

use tracing::debug;

use kaspacore_primitives::ec::PrivateKey;
use kaspacore_primitives::hash::sha256d;
use kaspacore_primitives::util::{ByteSink, KasReader, KasWriter};

use crate::config::SighashConfig;
use crate::input::{AnyInput, Input, InputSigner, TransactionSignature};
use crate::output::Output;
use crate::sighash::{self, SigHashReusedValues, SignatureScope};
use crate::signing::SigningScheme;
use crate::TransactionError;

/// Upper bound on capacity reserved from an untrusted element count.
const MAX_PREALLOCATED_ITEMS: u64 = 1024;

/// A transaction: version, inputs, outputs and lock time.
///
/// # Wire format
///
/// | Field        | Size                  |
/// |--------------|-----------------------|
/// | version      | 2 bytes (LE)          |
/// | input count  | 8 bytes (LE)          |
/// | inputs       | variable (per input)  |
/// | output count | 8 bytes (LE)          |
/// | outputs      | variable (per output) |
/// | lock_time    | 8 bytes (LE)          |
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub lock_time: u64,
}

impl Transaction {
    /// Create an empty transaction with version 0 and lock time 0.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::Serialization(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse exactly one transaction from raw bytes.
    ///
    /// # Returns
    /// The transaction, or an error if the data is truncated, malformed,
    /// or has trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = KasReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::Serialization(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `KasReader`.
    pub fn read_from(reader: &mut KasReader) -> Result<Self, TransactionError> {
        let version = reader.read_u16_le().map_err(|e| {
            TransactionError::Serialization(format!("reading version: {}", e))
        })?;

        let input_count = reader.read_u64_le().map_err(|e| {
            TransactionError::Serialization(format!("reading input count: {}", e))
        })?;
        let mut inputs = Vec::with_capacity(input_count.min(MAX_PREALLOCATED_ITEMS) as usize);
        for _ in 0..input_count {
            inputs.push(Input::read_from(reader)?);
        }

        let output_count = reader.read_u64_le().map_err(|e| {
            TransactionError::Serialization(format!("reading output count: {}", e))
        })?;
        let mut outputs = Vec::with_capacity(output_count.min(MAX_PREALLOCATED_ITEMS) as usize);
        for _ in 0..output_count {
            outputs.push(Output::read_from(reader)?);
        }

        let lock_time = reader.read_u64_le().map_err(|e| {
            TransactionError::Serialization(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize this transaction into any byte sink.
    pub fn write_to<W: ByteSink + ?Sized>(&self, writer: &mut W) {
        writer.write_u16_le(self.version);
        writer.write_u64_le(self.inputs.len() as u64);
        for input in &self.inputs {
            input.write_to(writer);
        }
        writer.write_u64_le(self.outputs.len() as u64);
        for output in &self.outputs {
            output.write_to(writer);
        }
        writer.write_u64_le(self.lock_time);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = KasWriter::with_capacity(256);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        let inputs: usize = self.inputs.iter().map(Input::estimate_size).sum();
        let outputs: usize = self.outputs.iter().map(|o| 18 + o.script.len()).sum();
        2 + 8 + inputs + 8 + outputs + 8
    }

    // -----------------------------------------------------------------
    // Transaction ID
    // -----------------------------------------------------------------

    /// Double SHA-256 of the serialized transaction, in internal byte order.
    pub fn tx_id(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    /// The transaction ID as display hex (byte-reversed).
    pub fn tx_id_hex(&self) -> String {
        let mut id = self.tx_id();
        id.reverse();
        hex::encode(id)
    }

    // -----------------------------------------------------------------
    // Inputs and outputs
    // -----------------------------------------------------------------

    pub fn add_input(&mut self, input: Input) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: Output) {
        self.outputs.push(output);
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Borrow the input at `index`.
    ///
    /// # Returns
    /// The input, or `InputIndexOutOfRange`.
    pub fn input(&self, index: usize) -> Result<&Input, TransactionError> {
        self.inputs
            .get(index)
            .ok_or(TransactionError::InputIndexOutOfRange {
                index,
                count: self.inputs.len(),
            })
    }

    /// True for a single null input.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_null()
    }

    // -----------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------

    /// Compute the digest for an input from its resolved spent output.
    ///
    /// # Returns
    /// The digest, or `MissingSpentOutputContext` when the input has no
    /// spent output.
    pub fn calc_input_signature_hash(
        &self,
        input_index: usize,
        scope: SignatureScope,
        config: &SighashConfig,
        cache: Option<&dyn SigHashReusedValues>,
    ) -> Result<[u8; 32], TransactionError> {
        let output = self
            .input(input_index)?
            .spent_output
            .as_ref()
            .ok_or(TransactionError::MissingSpentOutputContext(input_index))?;
        sighash::compute_signature_hash(
            self,
            scope,
            input_index,
            &output.script,
            Some(output.value),
            config,
            cache,
        )
    }

    /// Sign one input with `private_key` and store the signatures in its
    /// script.
    ///
    /// The input is classified by its spent output. Unsupported kinds fail
    /// with `UnsupportedInputKind`. A key that is not involved yields no
    /// signatures and leaves the input unchanged.
    ///
    /// # Returns
    /// The signatures that were added.
    pub fn sign_input(
        &mut self,
        input_index: usize,
        private_key: &PrivateKey,
        scope: SignatureScope,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<Vec<TransactionSignature>, TransactionError> {
        let mut kind = AnyInput::classify(self.input(input_index)?.clone())?;
        kind.recover_signatures(self, input_index, config, scheme)?;
        let signatures =
            kind.get_signatures(self, private_key, input_index, scope, config, scheme)?;
        for signature in &signatures {
            kind.add_signature(self, signature.clone(), config, scheme)?;
        }
        debug!(input_index, count = signatures.len(), "signed transaction input");
        self.inputs[input_index] = kind.into_input();
        Ok(signatures)
    }

    /// True when every input's kind reports itself fully signed.
    pub fn is_fully_signed(
        &self,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<bool, TransactionError> {
        for (index, input) in self.inputs.iter().enumerate() {
            let mut kind = AnyInput::classify(input.clone())?;
            kind.recover_signatures(self, index, config, scheme)?;
            if !kind.is_fully_signed()? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl std::fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
