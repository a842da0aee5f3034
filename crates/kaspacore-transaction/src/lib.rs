/// kaspacore - Transaction inputs, signature hashing and signing.
///
/// Provides the Input entity and its wire codec, the Output and
/// Transaction types it is hashed with, both signature-hash generations
/// (legacy fork-id and cached), the per-transaction reused-value caches,
/// and the ECDSA/Schnorr sign/verify dispatcher.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod config;
pub mod signing;

mod error;
pub use error::TransactionError;
pub use transaction::Transaction;
pub use input::{Input, InputParams};
pub use output::Output;
pub use config::SighashConfig;
pub use sighash::{SighashAlgorithm, SighashFlags, SignatureScope};
pub use signing::{Signature, SigningScheme};
