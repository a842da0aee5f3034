//! Transaction input referencing a previous output.
//!
//! Contains the previous transaction ID, output index, versioned signature
//! script, sequence number, and an optional copy of the spent output.
//! Provides the binary codec, relative lock-time helpers, and signature
//! validation against the spent output.

use serde::{Deserialize, Serialize};

use kaspacore_primitives::util::{ByteSink, KasReader, KasWriter};
use kaspacore_primitives::PrimitivesError;
use kaspacore_script::Script;

use crate::config::SighashConfig;
use crate::output::Output;
use crate::signing::{self, SigningScheme};
use crate::transaction::Transaction;
use crate::TransactionError;

mod any;
mod multisig;
mod public_key_hash;
mod signer;

pub use any::AnyInput;
pub use multisig::MultiSigInput;
pub use public_key_hash::PublicKeyHashInput;
pub use signer::{InputSigner, TransactionSignature};

// -----------------------------------------------------------------------
// Sequence number constants
// -----------------------------------------------------------------------

pub const MAXINT: u64 = 0xffff_ffff;

/// Default sequence number: final, no relative lock.
pub const DEFAULT_SEQUENCE_NUMBER: u64 = MAXINT;

/// Sequence number that enables the transaction lock time.
pub const DEFAULT_LOCKTIME_SEQUENCE_NUMBER: u64 = MAXINT - 1;

/// Sequence number that signals replace-by-fee.
pub const DEFAULT_RBF_SEQUENCE_NUMBER: u64 = MAXINT - 2;

/// When set, the sequence number carries no relative lock.
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u64 = 1 << 31;

/// When set, the relative lock is in units of 512 seconds, else in blocks.
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u64 = 1 << 22;

pub const SEQUENCE_LOCKTIME_MASK: u64 = 0xffff;
pub const SEQUENCE_LOCKTIME_GRANULARITY: u64 = 512;
pub const SEQUENCE_BLOCKDIFF_LIMIT: u64 = 0xffff;

/// A relative lock decoded from a sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTime {
    /// Seconds since the spent output was mined (multiple of 512).
    Seconds(u64),
    /// Blocks since the spent output was mined.
    BlockHeight(u64),
}

// -----------------------------------------------------------------------
// Input
// -----------------------------------------------------------------------

/// A single input of a transaction.
///
/// # Wire format
///
/// | Field             | Size                              |
/// |-------------------|-----------------------------------|
/// | previous_tx_id    | 32 bytes, stored order            |
/// | output_index      | 4 bytes (LE)                      |
/// | declared length   | 8 bytes (LE), `2 + script` or 0   |
/// | script_version    | 2 bytes (LE), only if length > 0  |
/// | script            | declared length - 2               |
/// | sequence_number   | 8 bytes (LE)                      |
///
/// # JSON form
///
/// `prevTxId` (hex), `outputIndex`, `sequenceNumber`, `script` (hex),
/// `scriptVersion`, and `output` when the spent output is known.
/// `version` is accepted for `scriptVersion` on input.
///
/// An empty script always carries version 0, since the wire form has no
/// room for the version of an empty script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "InputObject")]
pub struct Input {
    /// ID of the transaction holding the spent output.
    #[serde(rename = "prevTxId", with = "hex_id")]
    pub previous_tx_id: [u8; 32],

    /// Index of the spent output within that transaction.
    pub output_index: u32,

    /// Sequence number. Defaults to `0xffffffff` (final).
    #[serde(default = "default_sequence_number")]
    pub sequence_number: u64,

    /// The signature script.
    pub script: Script,

    /// Version of the signature script.
    #[serde(default)]
    pub script_version: u16,

    /// The output being spent, when resolved. Not serialized on the wire.
    #[serde(rename = "output", default, skip_serializing_if = "Option::is_none")]
    pub spent_output: Option<Output>,
}

fn default_sequence_number() -> u64 {
    DEFAULT_SEQUENCE_NUMBER
}

/// JSON object form, validated through [`Input::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputObject {
    #[serde(rename = "prevTxId", with = "hex_id")]
    previous_tx_id: [u8; 32],
    output_index: u32,
    #[serde(default = "default_sequence_number")]
    sequence_number: u64,
    #[serde(default)]
    script: Option<Script>,
    #[serde(default, alias = "version")]
    script_version: u16,
    #[serde(default)]
    output: Option<Output>,
}

impl TryFrom<InputObject> for Input {
    type Error = TransactionError;

    fn try_from(object: InputObject) -> Result<Self, Self::Error> {
        Input::new(InputParams {
            previous_tx_id: object.previous_tx_id,
            output_index: object.output_index,
            sequence_number: Some(object.sequence_number),
            script: object.script,
            script_version: object.script_version,
            output: object.output,
        })
    }
}

/// The version stored with `script`: 0 for an empty script.
fn script_version_for(script: &Script, version: u16) -> u16 {
    if script.is_empty() {
        0
    } else {
        version
    }
}

/// Descriptor for [`Input::new`].
#[derive(Clone, Debug, Default)]
pub struct InputParams {
    pub previous_tx_id: [u8; 32],
    pub output_index: u32,
    /// Defaults to [`DEFAULT_SEQUENCE_NUMBER`].
    pub sequence_number: Option<u64>,
    /// Required. An empty script is allowed; a missing one is not.
    pub script: Option<Script>,
    pub script_version: u16,
    pub output: Option<Output>,
}

impl Input {
    /// Build an input from a descriptor.
    ///
    /// `script_version` is dropped to 0 when the script is empty.
    ///
    /// # Returns
    /// The input, or `MissingScript` when `params.script` is `None`.
    pub fn new(params: InputParams) -> Result<Self, TransactionError> {
        let script = params.script.ok_or(TransactionError::MissingScript)?;
        Ok(Input {
            previous_tx_id: params.previous_tx_id,
            output_index: params.output_index,
            sequence_number: params.sequence_number.unwrap_or(DEFAULT_SEQUENCE_NUMBER),
            script_version: script_version_for(&script, params.script_version),
            script,
            spent_output: params.output,
        })
    }

    // -----------------------------------------------------------------
    // Codec
    // -----------------------------------------------------------------

    /// Deserialize an `Input` from a `KasReader`.
    ///
    /// # Returns
    /// `Ok(Input)` on success, or `TruncatedInput` if the buffer ends before
    /// a field or holds fewer script bytes than declared.
    pub fn read_from(reader: &mut KasReader) -> Result<Self, TransactionError> {
        let previous_tx_id = reader
            .read_array::<32>()
            .map_err(truncated("previous tx id"))?;

        let output_index = reader.read_u32_le().map_err(truncated("output index"))?;

        let declared = reader.read_u64_le().map_err(truncated("script length"))?;

        let (script_version, script) = match declared {
            0 => (0, Script::new()),
            1 => {
                return Err(TransactionError::TruncatedInput(
                    "declared script length 1 cannot hold a script version".to_string(),
                ))
            }
            _ => {
                let script_version = reader.read_u16_le().map_err(truncated("script version"))?;
                let script_len = usize::try_from(declared - 2).map_err(|_| {
                    TransactionError::TruncatedInput(format!(
                        "declared script length {} exceeds the buffer",
                        declared
                    ))
                })?;
                let bytes = reader
                    .read_bytes(script_len)
                    .map_err(truncated("signature script"))?;
                (script_version, Script::from_bytes(bytes))
            }
        };

        let sequence_number = reader.read_u64_le().map_err(truncated("sequence number"))?;

        Ok(Input {
            previous_tx_id,
            output_index,
            sequence_number,
            script,
            script_version,
            spent_output: None,
        })
    }

    /// Parse exactly one encoded input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = KasReader::new(bytes);
        let input = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::Serialization(format!(
                "trailing {} bytes after input",
                reader.remaining()
            )));
        }
        Ok(input)
    }

    /// Serialize this input into any byte sink.
    pub fn write_to<W: ByteSink + ?Sized>(&self, writer: &mut W) {
        writer.write_bytes(&self.previous_tx_id);
        writer.write_u32_le(self.output_index);
        if self.script.is_empty() {
            writer.write_u64_le(0);
        } else {
            writer.write_u64_le(2 + self.script.len() as u64);
            writer.write_u16_le(self.script_version);
            writer.write_bytes(self.script.to_bytes());
        }
        writer.write_u64_le(self.sequence_number);
    }

    /// Serialize this input to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = KasWriter::with_capacity(self.estimate_size());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Encoded size in bytes.
    pub fn estimate_size(&self) -> usize {
        let script = if self.script.is_empty() {
            0
        } else {
            2 + self.script.len()
        };
        32 + 4 + 8 + script + 8
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Replace the signature script. An empty script resets the version
    /// to 0.
    pub fn set_script(&mut self, script: Script) -> &mut Self {
        self.script_version = script_version_for(&script, self.script_version);
        self.script = script;
        self
    }

    /// A copy with `script` in place of the signature script and no
    /// spent output, as placed in a signature-hash transaction copy.
    pub(crate) fn detached_with_script(&self, script: Script) -> Input {
        Input {
            previous_tx_id: self.previous_tx_id,
            output_index: self.output_index,
            sequence_number: self.sequence_number,
            script_version: script_version_for(&script, self.script_version),
            script,
            spent_output: None,
        }
    }

    /// True for the coinbase marker: all-zero previous id and index `0xffffffff`.
    pub fn is_null(&self) -> bool {
        self.previous_tx_id == [0u8; 32] && self.output_index == 0xffff_ffff
    }

    /// True unless the sequence number is exactly `0xffffffff`.
    pub fn is_final(&self) -> bool {
        self.sequence_number != DEFAULT_SEQUENCE_NUMBER
    }

    // -----------------------------------------------------------------
    // Relative lock time
    // -----------------------------------------------------------------

    /// Lock the input until `seconds` after the spent output was mined.
    ///
    /// The value is stored in units of 512 seconds, rounded down.
    ///
    /// # Returns
    /// `LockTimeRange` unless `0 <= seconds < 512 * 65535`.
    pub fn lock_for_seconds(&mut self, seconds: i64) -> Result<&mut Self, TransactionError> {
        let limit = (SEQUENCE_LOCKTIME_GRANULARITY * SEQUENCE_LOCKTIME_MASK) as i64;
        if !(0..limit).contains(&seconds) {
            return Err(TransactionError::LockTimeRange(seconds));
        }
        self.sequence_number =
            (seconds as u64 / SEQUENCE_LOCKTIME_GRANULARITY) | SEQUENCE_LOCKTIME_TYPE_FLAG;
        Ok(self)
    }

    /// Lock the input until `height` blocks after the spent output was mined.
    ///
    /// # Returns
    /// `BlockHeightOutOfRange` unless `0 <= height < 65535`.
    pub fn lock_until_block_height(&mut self, height: i64) -> Result<&mut Self, TransactionError> {
        if !(0..SEQUENCE_BLOCKDIFF_LIMIT as i64).contains(&height) {
            return Err(TransactionError::BlockHeightOutOfRange(height));
        }
        self.sequence_number = height as u64;
        Ok(self)
    }

    /// Decode the relative lock, or `None` when the disable bit is set.
    pub fn lock_time(&self) -> Option<LockTime> {
        if self.sequence_number & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            return None;
        }
        let units = self.sequence_number & SEQUENCE_LOCKTIME_MASK;
        if self.sequence_number & SEQUENCE_LOCKTIME_TYPE_FLAG != 0 {
            Some(LockTime::Seconds(SEQUENCE_LOCKTIME_GRANULARITY * units))
        } else {
            Some(LockTime::BlockHeight(units))
        }
    }

    // -----------------------------------------------------------------
    // Signature validation
    // -----------------------------------------------------------------

    /// Check a collected signature against this input's spent output.
    ///
    /// The signature's own scope is replaced by `signature.scope`.
    ///
    /// # Returns
    /// `Ok(true)` when it verifies, or `MissingSpentOutputContext` when the
    /// spent output is not resolved.
    pub fn is_valid_signature(
        &self,
        tx: &Transaction,
        signature: &TransactionSignature,
        config: &SighashConfig,
        scheme: SigningScheme,
    ) -> Result<bool, TransactionError> {
        let output = self
            .spent_output
            .as_ref()
            .ok_or(TransactionError::MissingSpentOutputContext(signature.input_index))?;
        signing::verify(
            tx,
            &signature.scoped_signature(),
            &signature.public_key,
            signature.input_index,
            &output.script,
            Some(output.value),
            config,
            scheme,
        )
    }
}

fn truncated(field: &'static str) -> impl Fn(PrimitivesError) -> TransactionError {
    move |e| TransactionError::TruncatedInput(format!("reading {}: {}", field, e))
}

mod hex_id {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(id))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut id = [0u8; 32];
        hex::decode_to_slice(&s, &mut id).map_err(serde::de::Error::custom)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(script: &[u8]) -> Input {
        Input::new(InputParams {
            previous_tx_id: [0x11; 32],
            output_index: 2,
            sequence_number: Some(5),
            script: Some(Script::from_bytes(script)),
            script_version: 1,
            output: None,
        })
        .unwrap()
    }

    #[test]
    fn test_new_requires_script() {
        let err = Input::new(InputParams::default()).unwrap_err();
        assert!(matches!(err, TransactionError::MissingScript));

        let input = Input::new(InputParams {
            script: Some(Script::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(input.sequence_number, DEFAULT_SEQUENCE_NUMBER);
        assert!(!input.is_final());
    }

    #[test]
    fn test_wire_layout() {
        let input = sample_input(&[0xaa, 0xbb]);
        let bytes = input.to_bytes();
        assert_eq!(bytes.len(), 32 + 4 + 8 + 2 + 2 + 8);
        assert_eq!(bytes.len(), input.estimate_size());
        assert_eq!(&bytes[32..36], &2u32.to_le_bytes());
        assert_eq!(&bytes[36..44], &4u64.to_le_bytes());
        assert_eq!(&bytes[44..46], &1u16.to_le_bytes());
        assert_eq!(&bytes[46..48], &[0xaa, 0xbb]);
        assert_eq!(&bytes[48..], &5u64.to_le_bytes());
        assert_eq!(Input::from_bytes(&bytes).unwrap(), input);
    }

    #[test]
    fn test_empty_script_has_no_version() {
        let input = sample_input(&[]);
        assert_eq!(input.script_version, 0);
        assert_eq!(Input::from_bytes(&input.to_bytes()).unwrap(), input);

        let mut input = sample_input(&[0x51]);
        assert_eq!(input.script_version, 1);
        input.set_script(Script::new());
        assert_eq!(input.script_version, 0);
        assert_eq!(Input::from_bytes(&input.to_bytes()).unwrap(), input);

        let id = hex::encode([0x33; 32]);
        let from_json: Input = serde_json::from_str(&format!(
            r#"{{"prevTxId":"{}","outputIndex":0,"script":"","scriptVersion":9}}"#,
            id
        ))
        .unwrap();
        assert_eq!(from_json.script_version, 0);
    }

    #[test]
    fn test_json_accepts_version_key() {
        let id = hex::encode([0x44; 32]);
        let input: Input = serde_json::from_str(&format!(
            r#"{{"prevTxId":"{}","outputIndex":1,"script":"51","version":3}}"#,
            id
        ))
        .unwrap();
        assert_eq!(input.script_version, 3);
        assert_eq!(serde_json::to_value(&input).unwrap()["scriptVersion"], 3);
    }

    #[test]
    fn test_empty_script_round_trip() {
        let mut input = sample_input(&[]);
        input.script_version = 0;
        let bytes = input.to_bytes();
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[36..44], &[0u8; 8]);
        assert_eq!(Input::from_bytes(&bytes).unwrap(), input);
    }

    #[test]
    fn test_truncated() {
        let bytes = sample_input(&[1, 2, 3]).to_bytes();
        for cut in [0, 20, 33, 40, 45, 48, bytes.len() - 1] {
            let err = Input::from_bytes(&bytes[..cut]).unwrap_err();
            assert!(matches!(err, TransactionError::TruncatedInput(_)), "cut at {}", cut);
        }
    }

    #[test]
    fn test_declared_length_one() {
        let mut bytes = vec![0u8; 36];
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 10]);
        assert!(matches!(
            Input::from_bytes(&bytes),
            Err(TransactionError::TruncatedInput(_))
        ));
    }

    #[test]
    fn test_huge_declared_length() {
        let mut bytes = vec![0u8; 36];
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 10]);
        assert!(matches!(
            Input::from_bytes(&bytes),
            Err(TransactionError::TruncatedInput(_))
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = sample_input(&[1]).to_bytes();
        bytes.push(0);
        assert!(matches!(
            Input::from_bytes(&bytes),
            Err(TransactionError::Serialization(_))
        ));
    }

    #[test]
    fn test_is_null() {
        let mut input = sample_input(&[]);
        assert!(!input.is_null());
        input.previous_tx_id = [0u8; 32];
        input.output_index = 0xffff_ffff;
        assert!(input.is_null());
    }

    #[test]
    fn test_lock_for_seconds() {
        let mut input = sample_input(&[]);
        input.lock_for_seconds(0).unwrap();
        assert_eq!(input.lock_time(), Some(LockTime::Seconds(0)));

        input.lock_for_seconds(512 * 65535 - 1).unwrap();
        assert_eq!(input.sequence_number, 65534 | SEQUENCE_LOCKTIME_TYPE_FLAG);
        assert_eq!(input.lock_time(), Some(LockTime::Seconds(512 * 65534)));

        input.lock_for_seconds(1000).unwrap();
        assert_eq!(input.lock_time(), Some(LockTime::Seconds(512)));

        assert!(matches!(
            input.lock_for_seconds(512 * 65535),
            Err(TransactionError::LockTimeRange(_))
        ));
        assert!(matches!(
            input.lock_for_seconds(-1),
            Err(TransactionError::LockTimeRange(-1))
        ));
    }

    #[test]
    fn test_lock_until_block_height() {
        let mut input = sample_input(&[]);
        input.lock_until_block_height(0).unwrap();
        assert_eq!(input.lock_time(), Some(LockTime::BlockHeight(0)));

        input.lock_until_block_height(65534).unwrap();
        assert_eq!(input.sequence_number, 65534);
        assert_eq!(input.lock_time(), Some(LockTime::BlockHeight(65534)));

        assert!(matches!(
            input.lock_until_block_height(65535),
            Err(TransactionError::BlockHeightOutOfRange(65535))
        ));
        assert!(matches!(
            input.lock_until_block_height(-1),
            Err(TransactionError::BlockHeightOutOfRange(-1))
        ));
    }

    #[test]
    fn test_disabled_lock() {
        let mut input = sample_input(&[]);
        input.sequence_number = DEFAULT_SEQUENCE_NUMBER;
        assert_eq!(input.lock_time(), None);
        input.sequence_number = SEQUENCE_LOCKTIME_DISABLE_FLAG | SEQUENCE_LOCKTIME_TYPE_FLAG | 10;
        assert_eq!(input.lock_time(), None);
    }

    #[test]
    fn test_json_object() {
        let mut input = sample_input(&[0x51]);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["prevTxId"], hex::encode([0x11; 32]));
        assert_eq!(json["outputIndex"], 2);
        assert_eq!(json["sequenceNumber"], 5);
        assert_eq!(json["script"], "51");
        assert_eq!(json["scriptVersion"], 1);
        assert!(json.get("output").is_none());

        input.spent_output = Some(Output::new(77, Script::from_bytes(&[0xac])));
        let json = serde_json::to_string(&input).unwrap();
        let back: Input = serde_json::from_str(&json).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn test_json_defaults_and_errors() {
        let id = hex::encode([0x22; 32]);
        let input: Input = serde_json::from_str(&format!(
            r#"{{"prevTxId":"{}","outputIndex":0,"script":""}}"#,
            id
        ))
        .unwrap();
        assert_eq!(input.sequence_number, DEFAULT_SEQUENCE_NUMBER);
        assert_eq!(input.script_version, 0);

        let missing_script = format!(r#"{{"prevTxId":"{}","outputIndex":0}}"#, id);
        assert!(serde_json::from_str::<Input>(&missing_script).is_err());

        let short_id = r#"{"prevTxId":"00","outputIndex":0,"script":""}"#;
        assert!(serde_json::from_str::<Input>(short_id).is_err());
    }
}
