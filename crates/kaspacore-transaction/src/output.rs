//! Transaction output with a value and a versioned locking script.
//!
//! Outputs are hashed by both signature-hash generations and carried on
//! inputs as the resolved spent output.

use serde::{Deserialize, Serialize};

use kaspacore_primitives::util::{ByteSink, KasReader, KasWriter};
use kaspacore_script::Script;

use crate::TransactionError;

/// A single output of a transaction.
///
/// # Wire format
///
/// | Field          | Size              |
/// |----------------|-------------------|
/// | value          | 8 bytes (LE)      |
/// | script_version | 2 bytes (LE)      |
/// | script length  | 8 bytes (LE)      |
/// | script         | variable          |
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    /// Amount locked by this output, in the smallest unit.
    pub value: u64,

    /// Version of the locking script.
    #[serde(default)]
    pub script_version: u16,

    /// The locking script that defines spending conditions.
    pub script: Script,
}

impl Output {
    /// Create an output with script version 0.
    pub fn new(value: u64, script: Script) -> Self {
        Output {
            value,
            script_version: 0,
            script,
        }
    }

    /// Deserialize an `Output` from a `KasReader`.
    ///
    /// # Returns
    /// `Ok(Output)` on success, or a `Serialization` error naming the field
    /// that ran past the end of the buffer.
    pub fn read_from(reader: &mut KasReader) -> Result<Self, TransactionError> {
        let value = reader.read_u64_le().map_err(|e| {
            TransactionError::Serialization(format!("reading output value: {}", e))
        })?;

        let script_version = reader.read_u16_le().map_err(|e| {
            TransactionError::Serialization(format!("reading script version: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::Serialization(format!("reading locking script: {}", e))
        })?;

        Ok(Output {
            value,
            script_version,
            script: Script::from_bytes(script_bytes),
        })
    }

    /// Serialize this output into any byte sink.
    ///
    /// The signature-hash engine passes its hasher here, so the bytes
    /// hashed are exactly the wire bytes.
    pub fn write_to<W: ByteSink + ?Sized>(&self, writer: &mut W) {
        writer.write_u64_le(self.value);
        writer.write_u16_le(self.script_version);
        writer.write_var_bytes(self.script.to_bytes());
    }

    /// Serialize this output to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = KasWriter::with_capacity(18 + self.script.len());
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_wire_layout() {
        let out = Output {
            value: 0x0102,
            script_version: 1,
            script: Script::from_bytes(&[0xac]),
        };
        let bytes = out.to_bytes();
        assert_eq!(
            hex::encode(&bytes),
            concat!("0201000000000000", "0100", "0100000000000000", "ac")
        );
        let mut reader = KasReader::new(&bytes);
        assert_eq!(Output::read_from(&mut reader).unwrap(), out);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_output_truncated_script() {
        let mut bytes = Output::new(5, Script::from_bytes(&[1, 2, 3])).to_bytes();
        bytes.pop();
        let err = Output::read_from(&mut KasReader::new(&bytes)).unwrap_err();
        assert!(matches!(err, TransactionError::Serialization(_)));
    }

    #[test]
    fn test_output_json() {
        let out = Output::new(1000, Script::from_hex("76a9").unwrap());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["value"], 1000);
        assert_eq!(json["scriptVersion"], 0);
        assert_eq!(json["script"], "76a9");
        let back: Output = serde_json::from_value(json).unwrap();
        assert_eq!(back, out);
    }
}
