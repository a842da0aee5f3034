//! Memoization of the transaction-wide sub-hashes of the cached generation.
//!
//! Signing every input of a transaction recomputes the same four
//! sub-hashes (previous outputs, sequences, sig-op counts, outputs). A
//! cache holds each of them once computed. The caller owns the cache and
//! must discard it after changing the transaction's inputs or outputs.

use std::cell::Cell;
use std::sync::OnceLock;

/// A 32-byte sub-hash.
pub type Hash = [u8; 32];

/// Storage for the four reusable sub-hashes.
///
/// Each method returns the stored value, or runs `compute`, stores its
/// result and returns it. The trait is object safe so the engine can take
/// `&dyn SigHashReusedValues`.
pub trait SigHashReusedValues {
    fn previous_outputs_hash(&self, compute: &dyn Fn() -> Hash) -> Hash;
    fn sequences_hash(&self, compute: &dyn Fn() -> Hash) -> Hash;
    fn sig_op_counts_hash(&self, compute: &dyn Fn() -> Hash) -> Hash;
    fn outputs_hash(&self, compute: &dyn Fn() -> Hash) -> Hash;
}

// -----------------------------------------------------------------------
// Single-session cache
// -----------------------------------------------------------------------

/// Cache for one signing session on one thread.
#[derive(Debug, Default)]
pub struct ReusedValueCache {
    previous_outputs: Cell<Option<Hash>>,
    sequences: Cell<Option<Hash>>,
    sig_op_counts: Cell<Option<Hash>>,
    outputs: Cell<Option<Hash>>,
}

impl ReusedValueCache {
    pub fn new() -> Self {
        Self::default()
    }
}

fn memo_cell(slot: &Cell<Option<Hash>>, compute: &dyn Fn() -> Hash) -> Hash {
    if let Some(hash) = slot.get() {
        return hash;
    }
    let hash = compute();
    slot.set(Some(hash));
    hash
}

impl SigHashReusedValues for ReusedValueCache {
    fn previous_outputs_hash(&self, compute: &dyn Fn() -> Hash) -> Hash {
        memo_cell(&self.previous_outputs, compute)
    }

    fn sequences_hash(&self, compute: &dyn Fn() -> Hash) -> Hash {
        memo_cell(&self.sequences, compute)
    }

    fn sig_op_counts_hash(&self, compute: &dyn Fn() -> Hash) -> Hash {
        memo_cell(&self.sig_op_counts, compute)
    }

    fn outputs_hash(&self, compute: &dyn Fn() -> Hash) -> Hash {
        memo_cell(&self.outputs, compute)
    }
}

// -----------------------------------------------------------------------
// Thread-safe cache
// -----------------------------------------------------------------------

/// Cache shared by threads signing inputs of the same transaction.
///
/// Each slot is written at most once. When two threads miss the same
/// slot concurrently, the first stored value wins and both observe it.
#[derive(Debug, Default)]
pub struct SharedReusedValueCache {
    previous_outputs: OnceLock<Hash>,
    sequences: OnceLock<Hash>,
    sig_op_counts: OnceLock<Hash>,
    outputs: OnceLock<Hash>,
}

impl SharedReusedValueCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SigHashReusedValues for SharedReusedValueCache {
    fn previous_outputs_hash(&self, compute: &dyn Fn() -> Hash) -> Hash {
        *self.previous_outputs.get_or_init(compute)
    }

    fn sequences_hash(&self, compute: &dyn Fn() -> Hash) -> Hash {
        *self.sequences.get_or_init(compute)
    }

    fn sig_op_counts_hash(&self, compute: &dyn Fn() -> Hash) -> Hash {
        *self.sig_op_counts.get_or_init(compute)
    }

    fn outputs_hash(&self, compute: &dyn Fn() -> Hash) -> Hash {
        *self.outputs.get_or_init(compute)
    }
}
