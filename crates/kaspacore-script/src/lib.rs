/// kaspacore - Script bytes, chunk parsing and standard script builders.
///
/// Scripts are opaque to the signing core. This crate only provides what
/// signature hashing and input signing need: raw byte access, code-separator
/// removal, sig-op counting, and recognition and construction of the
/// pay-to-public-key-hash and bare multisig templates.

pub mod script;
pub mod opcodes;
pub mod chunk;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use chunk::ScriptChunk;
