/// Error types for script operations.
///
/// Covers truncated pushes, hex decoding, misuse of the builders and
/// template classification problems.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A push data opcode was passed to `append_opcodes`.
    #[error("use append_push_data for push data opcodes: {0:#04x}")]
    InvalidOpcodeType(u8),

    /// Script is not a P2PKH script.
    #[error("not a P2PKH")]
    NotP2PKH,

    /// Script is empty when a non-empty script was expected.
    #[error("script is empty")]
    EmptyScript,

    /// Multisig threshold is zero, above the key count, or above 16.
    #[error("invalid multisig threshold {threshold} of {keys} keys")]
    InvalidMultiSigThreshold { threshold: usize, keys: usize },

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] kaspacore_primitives::PrimitivesError),
}
