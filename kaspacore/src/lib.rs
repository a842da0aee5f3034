#![deny(missing_docs)]

//! kaspacore - transaction-signing core.
//!
//! Re-exports the kaspacore components for single-crate usage.

pub use kaspacore_primitives as primitives;
pub use kaspacore_script as script;
pub use kaspacore_transaction as transaction;

pub use kaspacore_transaction::{
    Input, Output, SighashAlgorithm, SighashConfig, SignatureScope, SigningScheme, Transaction,
    TransactionError,
};
