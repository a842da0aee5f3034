//! Signature-hash configuration.

use serde::{Deserialize, Serialize};

use crate::sighash::{SighashAlgorithm, SighashFlags};

/// Selects the signature-hash generation and its capability flags.
///
/// Loadable from JSON, e.g. `{"algorithm": "cached"}`. Missing fields take
/// their defaults: the legacy generation with FORKID enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SighashConfig {
    pub algorithm: SighashAlgorithm,
    pub flags: SighashFlags,
}

impl SighashConfig {
    pub fn legacy() -> Self {
        SighashConfig {
            algorithm: SighashAlgorithm::Legacy,
            flags: SighashFlags::ENABLE_SIGHASH_FORKID,
        }
    }

    pub fn cached() -> Self {
        SighashConfig {
            algorithm: SighashAlgorithm::Cached,
            flags: SighashFlags::ENABLE_SIGHASH_FORKID,
        }
    }

    /// Replace the capability flags.
    pub fn with_flags(mut self, flags: SighashFlags) -> Self {
        self.flags = flags;
        self
    }
}
