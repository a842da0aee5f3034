/// Script type: an opaque sequence of opcodes and data pushes.
///
/// Scripts appear in transaction inputs (signature scripts) and outputs
/// (locking scripts). The signing core treats them as bytes. The methods
/// here cover the few structural operations signature hashing and the
/// standard input kinds rely on.

use std::fmt;

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// A `Script` wrapping the decoded bytes, or an error if the hex is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Build a pay-to-public-key-hash locking script.
    ///
    /// Pattern: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    pub fn p2pkh_lock(public_key_hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(25);
        b.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(public_key_hash);
        b.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(b)
    }

    /// Build a pay-to-public-key-hash unlocking script: `<sig> <pubkey>`.
    ///
    /// # Arguments
    /// * `signature` - The signature bytes with the trailing sighash-type byte.
    /// * `public_key` - The serialized public key.
    pub fn p2pkh_unlock(signature: &[u8], public_key: &[u8]) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        script.append_push_data(signature)?;
        script.append_push_data(public_key)?;
        Ok(script)
    }

    /// Build a bare multisig locking script.
    ///
    /// Pattern: OP_m <pubkey1> ... <pubkeyN> OP_n OP_CHECKMULTISIG
    ///
    /// # Arguments
    /// * `threshold` - Number of signatures required (m).
    /// * `public_keys` - The serialized public keys, in signing order.
    ///
    /// # Returns
    /// The script, or `InvalidMultiSigThreshold` unless `1 <= m <= n <= 16`.
    pub fn multisig_lock(threshold: usize, public_keys: &[Vec<u8>]) -> Result<Self, ScriptError> {
        let n = public_keys.len();
        if threshold == 0 || threshold > n || n > MAX_MULTISIG_KEYS {
            return Err(ScriptError::InvalidMultiSigThreshold { threshold, keys: n });
        }
        let invalid = || ScriptError::InvalidMultiSigThreshold { threshold, keys: n };
        let mut script = Script::new();
        script.0.push(small_int_op(threshold).ok_or_else(invalid)?);
        for key in public_keys {
            if key.is_empty() {
                return Err(ScriptError::EmptyScript);
            }
            script.append_push_data(key)?;
        }
        script.0.push(small_int_op(n).ok_or_else(invalid)?);
        script.0.push(OP_CHECKMULTISIG);
        Ok(script)
    }

    /// Build a bare multisig unlocking script: `OP_0 <sig1> ... <sigM>`.
    ///
    /// The leading OP_0 is the dummy element consumed by OP_CHECKMULTISIG.
    pub fn multisig_unlock(signatures: &[Vec<u8>]) -> Result<Self, ScriptError> {
        let mut script = Script(vec![OP_0]);
        for sig in signatures {
            script.append_push_data(sig)?;
        }
        Ok(script)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize the script as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Return the raw script bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the number of bytes in the script.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the script is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the script into decoded chunks.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    // -----------------------------------------------------------------------
    // Signature hashing support
    // -----------------------------------------------------------------------

    /// Return a copy of this script with every OP_CODESEPARATOR removed.
    ///
    /// Data pushes that happen to contain the 0xab byte are kept intact.
    ///
    /// # Returns
    /// The filtered script, or `DataTooSmall` if a push is truncated.
    pub fn remove_code_separators(&self) -> Result<Script, ScriptError> {
        let chunks = self.chunks()?;
        let mut out = Vec::with_capacity(self.0.len());
        for chunk in chunks.iter().filter(|c| c.op != OP_CODESEPARATOR) {
            chunk.encode_into(&mut out);
        }
        Ok(Script(out))
    }

    /// Count the signature operations in this script.
    ///
    /// OP_CHECKSIG and OP_CHECKSIGVERIFY count one each. OP_CHECKMULTISIG
    /// and OP_CHECKMULTISIGVERIFY count the preceding small-int key count
    /// when `accurate` is set, and 20 otherwise.
    pub fn sig_op_count(&self, accurate: bool) -> Result<usize, ScriptError> {
        let mut count = 0;
        let mut last_op = None;
        for chunk in self.chunks()? {
            match chunk.op {
                OP_CHECKSIG | OP_CHECKSIGVERIFY => count += 1,
                OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
                    count += match last_op.and_then(small_int_value) {
                        Some(n) if accurate && n > 0 => n,
                        _ => MAX_PUBKEYS_PER_MULTISIG,
                    };
                }
                _ => {}
            }
            last_op = Some(chunk.op);
        }
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Template classification
    // -----------------------------------------------------------------------

    /// Check if this is a pay-to-public-key-hash locking script.
    pub fn is_public_key_hash_out(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Check if this is a bare multisig locking script.
    ///
    /// Pattern: OP_m <pubkey1> ... <pubkeyN> OP_n OP_CHECKMULTISIG with
    /// `1 <= m <= n` and the key count matching `n`.
    pub fn is_multisig_out(&self) -> bool {
        self.multisig_params().is_ok()
    }

    /// Extract the 20-byte public key hash from a P2PKH locking script.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if self.0.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_public_key_hash_out() {
            return Err(ScriptError::NotP2PKH);
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.0[3..23]);
        Ok(out)
    }

    /// Extract the threshold and public keys from a bare multisig script.
    ///
    /// # Returns
    /// `(m, keys)`, or `InvalidMultiSigThreshold` if the script does not
    /// follow the template.
    pub fn multisig_params(&self) -> Result<(usize, Vec<Vec<u8>>), ScriptError> {
        let parts = self.chunks()?;
        let invalid = || ScriptError::InvalidMultiSigThreshold {
            threshold: 0,
            keys: parts.len().saturating_sub(3),
        };
        if parts.len() < 4 || parts[parts.len() - 1].op != OP_CHECKMULTISIG {
            return Err(invalid());
        }
        let m = small_int_value(parts[0].op).ok_or_else(invalid)?;
        let n = small_int_value(parts[parts.len() - 2].op).ok_or_else(invalid)?;

        let mut keys = Vec::with_capacity(n);
        for chunk in &parts[1..parts.len() - 2] {
            match &chunk.data {
                Some(d) if !d.is_empty() => keys.push(d.clone()),
                _ => return Err(invalid()),
            }
        }
        if m == 0 || m > n || keys.len() != n {
            return Err(ScriptError::InvalidMultiSigThreshold { threshold: m, keys: keys.len() });
        }
        Ok((m, keys))
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append data bytes with the minimal push prefix.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append raw opcodes.
    ///
    /// Rejects push opcodes (OP_DATA_1..OP_PUSHDATA4); use
    /// `append_push_data` for those.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        if let Some(&op) = opcodes
            .iter()
            .find(|&&op| (OP_DATA_1..=OP_PUSHDATA4).contains(&op))
        {
            return Err(ScriptError::InvalidOpcodeType(op));
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl fmt::Display for Script {
    /// Display the script as a lowercase hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2PKH_HEX: &str = "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac";

    fn pubkey(tag: u8) -> Vec<u8> {
        let mut k = vec![0x02];
        k.extend_from_slice(&[tag; 32]);
        k
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn test_from_hex_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).expect("valid hex should parse");
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert_eq!(script.len(), 25);
        assert!(Script::from_hex("").unwrap().is_empty());
        assert!(matches!(Script::from_hex("ZZ"), Err(ScriptError::InvalidHex(_))));
    }

    #[test]
    fn test_p2pkh_lock_and_hash() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert!(script.is_public_key_hash_out());
        let pkh = script.public_key_hash().unwrap();
        assert_eq!(hex::encode(pkh), "e2a623699e81b291c0327f408fea765d534baa2a");
        assert_eq!(Script::p2pkh_lock(&pkh), script);
    }

    #[test]
    fn test_public_key_hash_errors() {
        assert!(matches!(Script::new().public_key_hash(), Err(ScriptError::EmptyScript)));
        assert!(matches!(
            Script::from_bytes(&[OP_DUP, OP_HASH160]).public_key_hash(),
            Err(ScriptError::NotP2PKH)
        ));
    }

    #[test]
    fn test_p2pkh_unlock() {
        let sig = vec![0x30; 71];
        let key = pubkey(1);
        let script = Script::p2pkh_unlock(&sig, &key).unwrap();
        let chunks = script.chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data.as_deref(), Some(sig.as_slice()));
        assert_eq!(chunks[1].data.as_deref(), Some(key.as_slice()));
    }

    // -----------------------------------------------------------------------
    // Multisig
    // -----------------------------------------------------------------------

    #[test]
    fn test_multisig_lock_round_trip() {
        let keys = vec![pubkey(1), pubkey(2), pubkey(3)];
        let script = Script::multisig_lock(2, &keys).unwrap();
        assert!(script.is_multisig_out());
        assert!(!script.is_public_key_hash_out());

        let (m, parsed) = script.multisig_params().unwrap();
        assert_eq!(m, 2);
        assert_eq!(parsed, keys);
        assert_eq!(script.sig_op_count(true).unwrap(), 3);
        assert_eq!(script.sig_op_count(false).unwrap(), 20);
    }

    #[test]
    fn test_multisig_threshold_validation() {
        let keys = vec![pubkey(1), pubkey(2)];
        assert!(matches!(
            Script::multisig_lock(0, &keys),
            Err(ScriptError::InvalidMultiSigThreshold { threshold: 0, keys: 2 })
        ));
        assert!(Script::multisig_lock(3, &keys).is_err());
        let many: Vec<Vec<u8>> = (0..17).map(pubkey).collect();
        assert!(Script::multisig_lock(1, &many).is_err());
    }

    #[test]
    fn test_multisig_unlock_has_dummy() {
        let script = Script::multisig_unlock(&[vec![1, 2], vec![3]]).unwrap();
        assert_eq!(script.to_bytes(), &[OP_0, 2, 1, 2, 1, 3]);
    }

    // -----------------------------------------------------------------------
    // Signature hashing support
    // -----------------------------------------------------------------------

    #[test]
    fn test_remove_code_separators() {
        // <push ab> OP_CODESEPARATOR OP_DUP OP_CODESEPARATOR OP_CHECKSIG
        let script = Script::from_bytes(&[
            0x01,
            OP_CODESEPARATOR,
            OP_CODESEPARATOR,
            OP_DUP,
            OP_CODESEPARATOR,
            OP_CHECKSIG,
        ]);
        let stripped = script.remove_code_separators().unwrap();
        assert_eq!(stripped.to_bytes(), &[0x01, OP_CODESEPARATOR, OP_DUP, OP_CHECKSIG]);

        let plain = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(plain.remove_code_separators().unwrap(), plain);
        assert!(Script::from_bytes(&[0x05, 1]).remove_code_separators().is_err());
    }

    #[test]
    fn test_sig_op_count_checksig() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(script.sig_op_count(true).unwrap(), 1);

        let two = Script::from_bytes(&[OP_CHECKSIG, OP_CHECKSIGVERIFY]);
        assert_eq!(two.sig_op_count(false).unwrap(), 2);
        assert_eq!(Script::new().sig_op_count(true).unwrap(), 0);
    }

    // -----------------------------------------------------------------------
    // Mutation and serde
    // -----------------------------------------------------------------------

    #[test]
    fn test_append_opcodes_rejects_pushes() {
        let mut script = Script::new();
        script.append_opcodes(&[OP_DUP, OP_HASH160]).unwrap();
        assert!(matches!(
            script.append_opcodes(&[OP_PUSHDATA1]),
            Err(ScriptError::InvalidOpcodeType(OP_PUSHDATA1))
        ));
        assert_eq!(script.to_bytes(), &[OP_DUP, OP_HASH160]);
    }

    #[test]
    fn test_serde_hex_string() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, format!("\"{}\"", P2PKH_HEX));
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
        assert!(serde_json::from_str::<Script>("\"xyz\"").is_err());
    }
}
