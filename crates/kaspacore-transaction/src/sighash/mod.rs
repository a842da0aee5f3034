//! Signature hash computation for transaction signing.
//!
//! Two generations coexist and are selected explicitly:
//!
//! - [`legacy`]: the fork-id digest (BIP-143 style, double SHA-256,
//!   byte-reversed) and the older full-copy digest it falls back to.
//! - [`cached`]: a keyed BLAKE2b digest whose transaction-wide sub-hashes
//!   are memoized in a caller-owned [`SigHashReusedValues`] cache.
//!
//! Their byte layouts are incompatible, so historical digests of either
//! generation stay reproducible.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};
use tracing::debug;

use kaspacore_script::Script;

use crate::config::SighashConfig;
use crate::output::Output;
use crate::transaction::Transaction;
use crate::TransactionError;

pub mod cache;
pub mod cached;
pub mod legacy;

pub use cache::{ReusedValueCache, SharedReusedValueCache, SigHashReusedValues};

/// Digest returned by the full-copy legacy path for SIGHASH_SINGLE when
/// the signed input has no output at the same index.
pub const SIGHASH_SINGLE_BUG: [u8; 32] = {
    let mut bug = [0u8; 32];
    bug[31] = 0x01;
    bug
};

// -----------------------------------------------------------------------
// Signature scope
// -----------------------------------------------------------------------

/// Which parts of the transaction a signature commits to.
///
/// The low five bits select the base type (ALL, NONE, SINGLE); the
/// remaining bits carry the FORKID and ANYONECANPAY modifiers and, under
/// replay protection, a fork value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureScope(pub u32);

impl SignatureScope {
    pub const ALL: SignatureScope = SignatureScope(0x01);
    pub const NONE: SignatureScope = SignatureScope(0x02);
    pub const SINGLE: SignatureScope = SignatureScope(0x03);
    pub const FORKID: SignatureScope = SignatureScope(0x40);
    pub const ANYONECANPAY: SignatureScope = SignatureScope(0x80);

    /// The standard scope: ALL | FORKID.
    pub const ALL_FORKID: SignatureScope = SignatureScope(0x41);

    /// Mask applied to extract the base type.
    pub const MASK: u32 = 0x1f;

    /// The raw 32-bit value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// The low byte, as appended to a signature in a script.
    pub fn to_byte(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// The base type bits (`value & 0x1f`).
    pub fn base_type(self) -> u32 {
        self.0 & Self::MASK
    }

    pub fn is_none(self) -> bool {
        self.base_type() == Self::NONE.0
    }

    pub fn is_single(self) -> bool {
        self.base_type() == Self::SINGLE.0
    }

    pub fn has_anyone_can_pay(self) -> bool {
        self.0 & Self::ANYONECANPAY.0 != 0
    }

    pub fn has_fork_id(self) -> bool {
        self.0 & Self::FORKID.0 != 0
    }

    /// Rewrite the fork value so the scope can never collide with one
    /// valid on the chain being protected against.
    ///
    /// The bits above the low byte become `0xff0000 | (fork ^ 0xdead)`.
    pub fn with_replay_protection(self) -> SignatureScope {
        let fork_value = self.0 >> 8;
        let new_fork_value = 0x00ff_0000 | (fork_value ^ 0xdead);
        SignatureScope((new_fork_value << 8) | (self.0 & 0xff))
    }
}

impl Default for SignatureScope {
    fn default() -> Self {
        SignatureScope::ALL_FORKID
    }
}

impl BitOr for SignatureScope {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        SignatureScope(self.0 | rhs.0)
    }
}

// -----------------------------------------------------------------------
// Algorithm selection
// -----------------------------------------------------------------------

/// Capability flags consulted by the legacy generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SighashFlags(pub u32);

impl SighashFlags {
    pub const NONE: SighashFlags = SighashFlags(0);
    pub const ENABLE_SIGHASH_FORKID: SighashFlags = SighashFlags(1 << 16);
    pub const ENABLE_REPLAY_PROTECTION: SighashFlags = SighashFlags(1 << 17);

    pub fn has_flag(self, flag: SighashFlags) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl Default for SighashFlags {
    fn default() -> Self {
        SighashFlags::ENABLE_SIGHASH_FORKID
    }
}

impl BitOr for SighashFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        SighashFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SighashFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Which signature-hash generation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SighashAlgorithm {
    /// Fork-id digest, with the full-copy digest as fallback.
    #[default]
    Legacy,
    /// Keyed BLAKE2b digest with memoized sub-hashes.
    Cached,
}

/// The output consumed by the input being signed, as the cached
/// generation commits to it.
#[derive(Debug, Clone, Copy)]
pub struct SpentOutput<'a> {
    pub script_version: u16,
    pub script: &'a [u8],
    pub value: u64,
}

impl<'a> From<&'a Output> for SpentOutput<'a> {
    fn from(output: &'a Output) -> Self {
        SpentOutput {
            script_version: output.script_version,
            script: output.script.to_bytes(),
            value: output.value,
        }
    }
}

// -----------------------------------------------------------------------
// Entry point
// -----------------------------------------------------------------------

/// Compute the digest to sign for one input.
///
/// # Arguments
/// * `tx`          - The transaction being signed.
/// * `scope`       - Signature scope.
/// * `input_index` - Index of the input being signed.
/// * `subscript`   - Script the signature commits to (usually the spent
///   output's locking script).
/// * `spent_value` - Value of the spent output. Required by the fork-id
///   digest and by the cached digest when the input has no resolved
///   spent output.
/// * `config`      - Algorithm and capability flags.
/// * `cache`       - Reused-value cache for the cached generation. When
///   `None`, a fresh cache is used for this call only.
///
/// # Returns
/// The 32-byte digest.
pub fn compute_signature_hash(
    tx: &Transaction,
    scope: SignatureScope,
    input_index: usize,
    subscript: &Script,
    spent_value: Option<u64>,
    config: &SighashConfig,
    cache: Option<&dyn SigHashReusedValues>,
) -> Result<[u8; 32], TransactionError> {
    let digest = match config.algorithm {
        SighashAlgorithm::Legacy => legacy::signature_hash(
            tx,
            scope,
            input_index,
            subscript,
            spent_value,
            config.flags,
        )?,
        SighashAlgorithm::Cached => {
            let input = tx.input(input_index)?;
            let spent = match &input.spent_output {
                Some(output) => SpentOutput::from(output),
                None => SpentOutput {
                    script_version: 0,
                    script: subscript.to_bytes(),
                    value: spent_value
                        .ok_or(TransactionError::MissingSpentOutputContext(input_index))?,
                },
            };
            match cache {
                Some(reused) => cached::signature_hash(tx, input_index, scope, &spent, reused)?,
                None => {
                    let reused = ReusedValueCache::new();
                    cached::signature_hash(tx, input_index, scope, &spent, &reused)?
                }
            }
        }
    };

    debug!(
        input_index,
        scope = scope.value(),
        algorithm = ?config.algorithm,
        digest = %hex::encode(digest),
        "computed signature hash"
    );
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_bits() {
        let scope = SignatureScope::SINGLE | SignatureScope::ANYONECANPAY | SignatureScope::FORKID;
        assert_eq!(scope.value(), 0xc3);
        assert!(scope.is_single());
        assert!(!scope.is_none());
        assert!(scope.has_anyone_can_pay());
        assert!(scope.has_fork_id());
        assert_eq!(scope.to_byte(), 0xc3);
        assert_eq!(SignatureScope::default(), SignatureScope::ALL_FORKID);
    }

    #[test]
    fn test_replay_protection_rewrite() {
        let scope = SignatureScope::ALL_FORKID.with_replay_protection();
        assert_eq!(scope.value(), 0xffde_ad41);
        assert_eq!(scope.to_byte(), 0x41);

        let forked = SignatureScope(0x0012_3441).with_replay_protection();
        assert_eq!(forked.value() >> 8, 0x00ff_0000 | (0x1234 ^ 0xdead));
    }

    #[test]
    fn test_flags() {
        let flags = SighashFlags::default();
        assert!(flags.has_flag(SighashFlags::ENABLE_SIGHASH_FORKID));
        assert!(!flags.has_flag(SighashFlags::ENABLE_REPLAY_PROTECTION));

        let mut both = SighashFlags::NONE;
        both |= SighashFlags::ENABLE_SIGHASH_FORKID | SighashFlags::ENABLE_REPLAY_PROTECTION;
        assert_eq!(both.0, 0x30000);
    }

    #[test]
    fn test_sentinel() {
        assert_eq!(
            hex::encode(SIGHASH_SINGLE_BUG),
            "0000000000000000000000000000000000000000000000000000000000000001"
        );
    }
}
