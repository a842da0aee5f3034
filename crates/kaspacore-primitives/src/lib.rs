/// kaspacore - Binary codec, hashing, and secp256k1 signing primitives.
///
/// This crate provides the foundational building blocks for kaspacore:
/// - Little-endian reader/writer with length-prefixed byte strings
/// - Hash functions (SHA-256, SHA-256d, Hash160, keyed BLAKE2b signing hash)
/// - secp256k1 private/public keys and ECDSA signatures
/// - Schnorr (BIP-340) signatures over x-only public keys

pub mod hash;
pub mod util;
pub mod ec;
pub mod ecdsa;
pub mod schnorr;

mod error;
pub use error::PrimitivesError;
