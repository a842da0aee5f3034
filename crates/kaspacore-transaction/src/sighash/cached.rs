//! Cached-generation signature hash.
//!
//! Every field streams into one BLAKE2b-256 hasher keyed with
//! `"TransactionSigningHash"`. The transaction-wide sub-hashes use the
//! same keyed hasher and are memoized through [`SigHashReusedValues`].
//! No digest of this generation is byte-reversed.

use tracing::trace;

use kaspacore_primitives::hash::{TransactionSigningHasher, ZERO_HASH};
use kaspacore_primitives::util::ByteSink;

use crate::sighash::cache::{Hash, SigHashReusedValues};
use crate::sighash::{SignatureScope, SpentOutput};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Sig-op count committed for every input.
pub const SIG_OP_COUNT: u8 = 1;

/// Placeholder subnetwork identifier of a native transaction.
pub const SUBNETWORK_ID_NATIVE: [u8; 20] = [0u8; 20];

/// Compute the cached-generation digest for one input.
///
/// Field order:
/// 1. version (u16)
/// 2. previous-outputs hash
/// 3. sequences hash
/// 4. sig-op-counts hash
/// 5. outpoint: previous tx id (32) + output index (u32)
/// 6. spent script version (u16) + length-prefixed spent script
/// 7. spent value (u64)
/// 8. sequence (u64)
/// 9. sig-op count (u8)
/// 10. outputs hash
/// 11. lock time (u64)
/// 12. subnetwork id (20 zero bytes), gas (u64 zero), payload hash (32 zero bytes)
/// 13. scope (u8)
///
/// # Arguments
/// * `tx`          - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `scope`       - Signature scope.
/// * `spent`       - The output consumed by the input.
/// * `reused`      - Cache for the transaction-wide sub-hashes.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    scope: SignatureScope,
    spent: &SpentOutput<'_>,
    reused: &dyn SigHashReusedValues,
) -> Result<[u8; 32], TransactionError> {
    let input = tx.input(input_index)?;

    let mut hasher = TransactionSigningHasher::new();
    hasher.write_u16_le(tx.version);
    hasher.write_bytes(&previous_outputs_hash(tx, scope, reused));
    hasher.write_bytes(&sequences_hash(tx, scope, reused));
    hasher.write_bytes(&sig_op_counts_hash(tx, scope, reused));

    hasher.write_bytes(&input.previous_tx_id);
    hasher.write_u32_le(input.output_index);
    hasher.write_u16_le(spent.script_version);
    hasher.write_var_bytes(spent.script);
    hasher.write_u64_le(spent.value);
    hasher.write_u64_le(input.sequence_number);
    hasher.write_u8(SIG_OP_COUNT);

    hasher.write_bytes(&outputs_hash(tx, scope, input_index, reused));
    hasher.write_u64_le(tx.lock_time);
    hasher.write_bytes(&SUBNETWORK_ID_NATIVE);
    hasher.write_u64_le(0);
    hasher.write_bytes(&ZERO_HASH);
    hasher.write_u8(scope.to_byte());

    Ok(hasher.finalize())
}

// -----------------------------------------------------------------------
// Sub-hashes
// -----------------------------------------------------------------------

/// Hash of every input's outpoint, or zero under ANYONECANPAY.
pub fn previous_outputs_hash(
    tx: &Transaction,
    scope: SignatureScope,
    reused: &dyn SigHashReusedValues,
) -> Hash {
    if scope.has_anyone_can_pay() {
        return ZERO_HASH;
    }
    reused.previous_outputs_hash(&|| {
        trace!(inputs = tx.inputs.len(), "hashing previous outputs");
        let mut hasher = TransactionSigningHasher::new();
        for input in &tx.inputs {
            hasher.write_bytes(&input.previous_tx_id);
            hasher.write_u32_le(input.output_index);
        }
        hasher.finalize()
    })
}

/// Hash of every input's sequence number, or zero under ANYONECANPAY,
/// SINGLE or NONE.
pub fn sequences_hash(
    tx: &Transaction,
    scope: SignatureScope,
    reused: &dyn SigHashReusedValues,
) -> Hash {
    if scope.has_anyone_can_pay() || scope.is_single() || scope.is_none() {
        return ZERO_HASH;
    }
    reused.sequences_hash(&|| {
        trace!(inputs = tx.inputs.len(), "hashing sequences");
        let mut hasher = TransactionSigningHasher::new();
        for input in &tx.inputs {
            hasher.write_u64_le(input.sequence_number);
        }
        hasher.finalize()
    })
}

/// Hash of one sig-op count byte per input, or zero under ANYONECANPAY.
pub fn sig_op_counts_hash(
    tx: &Transaction,
    scope: SignatureScope,
    reused: &dyn SigHashReusedValues,
) -> Hash {
    if scope.has_anyone_can_pay() {
        return ZERO_HASH;
    }
    reused.sig_op_counts_hash(&|| {
        trace!(inputs = tx.inputs.len(), "hashing sig-op counts");
        let mut hasher = TransactionSigningHasher::new();
        for _ in &tx.inputs {
            hasher.write_u8(SIG_OP_COUNT);
        }
        hasher.finalize()
    })
}

/// Hash of the committed outputs.
///
/// NONE commits to nothing. SINGLE commits to the output at the signed
/// input's index (zero when there is none) and is not cached, since it
/// differs per input. Every other base type hashes all outputs once.
pub fn outputs_hash(
    tx: &Transaction,
    scope: SignatureScope,
    input_index: usize,
    reused: &dyn SigHashReusedValues,
) -> Hash {
    if scope.is_none() {
        return ZERO_HASH;
    }
    if scope.is_single() {
        return match tx.outputs.get(input_index) {
            Some(output) => {
                let mut hasher = TransactionSigningHasher::new();
                output.write_to(&mut hasher);
                hasher.finalize()
            }
            None => ZERO_HASH,
        };
    }
    reused.outputs_hash(&|| {
        trace!(outputs = tx.outputs.len(), "hashing outputs");
        let mut hasher = TransactionSigningHasher::new();
        for output in &tx.outputs {
            output.write_to(&mut hasher);
        }
        hasher.finalize()
    })
}
