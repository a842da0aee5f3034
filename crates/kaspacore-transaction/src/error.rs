/// Error types for input decoding, signature hashing and signing.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Decoding an input ran past the end of the buffer.
    #[error("truncated input: {0}")]
    TruncatedInput(String),

    /// An input was constructed without a signature script.
    #[error("input requires a script")]
    MissingScript,

    /// Relative time lock outside `0..512 * 65535` seconds.
    #[error("relative lock time of {0} seconds is out of range")]
    LockTimeRange(i64),

    /// Relative block lock outside `0..65535` blocks.
    #[error("relative block height {0} is out of range")]
    BlockHeightOutOfRange(i64),

    /// The input kind does not support the requested signing operation.
    #[error("unsupported input kind: {0}")]
    UnsupportedInputKind(String),

    /// The spent output (or its value) needed for this input is unknown.
    #[error("missing spent output for input {0}")]
    MissingSpentOutputContext(usize),

    /// A signature was verified without a signature scope attached.
    #[error("signature has no scope attached")]
    MissingScopeMetadata,

    /// The signing scheme name is neither "ecdsa" nor "schnorr".
    #[error("unknown signing scheme: {0}")]
    UnknownSigningScheme(String),

    /// The signature was produced by a different scheme than requested.
    #[error("signature does not match the requested signing scheme")]
    InvalidSignatureScheme,

    /// The input index does not exist in the transaction.
    #[error("input index {index} out of range (tx has {count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },

    /// Binary, hex or JSON (de)serialization failed outside an input body.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A signature failed validation when added to an input.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// An underlying script error (forwarded from `kaspacore-script`).
    #[error("script error: {0}")]
    Script(#[from] kaspacore_script::ScriptError),

    /// An underlying primitives error (forwarded from `kaspacore-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] kaspacore_primitives::PrimitivesError),
}
