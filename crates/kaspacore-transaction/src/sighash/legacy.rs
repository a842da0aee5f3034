//! Legacy-generation signature hash.
//!
//! Two digests live here. The fork-id digest (BIP-143 style) assembles
//! sub-hashes of the original transaction with the signed input's
//! outpoint, subscript and value. The full-copy digest serializes a
//! modified copy of the transaction. Both double SHA-256 their preimage
//! and return the result byte-reversed, except for the SIGHASH_SINGLE
//! sentinel.
//!
//! See <https://github.com/bitcoin-sv/bitcoin-sv/blob/master/doc/abc/replay-protected-sighash.md#digest-algorithm>

use tracing::warn;

use kaspacore_primitives::hash::{sha256d, ZERO_HASH};
use kaspacore_primitives::util::{ByteSink, KasWriter};
use kaspacore_script::Script;

use crate::input::Input;
use crate::output::Output;
use crate::sighash::{SighashFlags, SignatureScope, SIGHASH_SINGLE_BUG};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Compute the legacy-generation digest for one input.
///
/// Replay protection, when enabled in `flags`, rewrites the scope first.
/// The fork-id digest is used when both the scope and `flags` carry
/// FORKID; otherwise the full-copy digest is used.
///
/// # Arguments
/// * `tx`          - The transaction being signed.
/// * `scope`       - Signature scope.
/// * `input_index` - Index of the input being signed.
/// * `subscript`   - Script placed in the signed input's slot.
/// * `spent_value` - Value of the spent output; required by the fork-id digest.
/// * `flags`       - Capability flags.
pub fn signature_hash(
    tx: &Transaction,
    scope: SignatureScope,
    input_index: usize,
    subscript: &Script,
    spent_value: Option<u64>,
    flags: SighashFlags,
) -> Result<[u8; 32], TransactionError> {
    tx.input(input_index)?;

    let scope = if flags.has_flag(SighashFlags::ENABLE_REPLAY_PROTECTION) {
        scope.with_replay_protection()
    } else {
        scope
    };

    if scope.has_fork_id() && flags.has_flag(SighashFlags::ENABLE_SIGHASH_FORKID) {
        let value =
            spent_value.ok_or(TransactionError::MissingSpentOutputContext(input_index))?;
        return fork_id_hash(tx, scope, input_index, subscript, value);
    }

    full_copy_hash(tx, scope, input_index, subscript)
}

// -----------------------------------------------------------------------
// Fork-id digest
// -----------------------------------------------------------------------

/// Compute the fork-id preimage.
///
/// The preimage consists of:
/// 1. version (i32)
/// 2. hashPrevouts, zero under ANYONECANPAY
/// 3. hashSequence, zero under ANYONECANPAY, SINGLE or NONE
/// 4. outpoint: reversed previous tx id + output index (u32)
/// 5. length-prefixed subscript
/// 6. spent value (u64)
/// 7. sequence (u32)
/// 8. hashOutputs: all outputs, the matching one for SINGLE, or zero
/// 9. lock time (u32)
/// 10. scope (u32)
pub fn fork_id_preimage(
    tx: &Transaction,
    scope: SignatureScope,
    input_index: usize,
    subscript: &Script,
    spent_value: u64,
) -> Result<Vec<u8>, TransactionError> {
    let input = tx.input(input_index)?;

    let hash_prevouts = if !scope.has_anyone_can_pay() {
        prevouts_hash(tx)
    } else {
        ZERO_HASH
    };

    let hash_sequence = if !scope.has_anyone_can_pay() && !scope.is_single() && !scope.is_none() {
        sequence_hash(tx)
    } else {
        ZERO_HASH
    };

    let hash_outputs = if !scope.is_single() && !scope.is_none() {
        outputs_hash(&tx.outputs)
    } else if scope.is_single() && input_index < tx.outputs.len() {
        outputs_hash(&tx.outputs[input_index..=input_index])
    } else {
        ZERO_HASH
    };

    let mut writer = KasWriter::with_capacity(180 + subscript.len());
    writer.write_i32_le(i32::from(tx.version));
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);
    writer.write_reversed(&input.previous_tx_id);
    writer.write_u32_le(input.output_index);
    writer.write_var_bytes(subscript.to_bytes());
    writer.write_u64_le(spent_value);
    writer.write_u32_le(input.sequence_number as u32);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time as u32);
    writer.write_u32_le(scope.value());

    Ok(writer.into_bytes())
}

fn fork_id_hash(
    tx: &Transaction,
    scope: SignatureScope,
    input_index: usize,
    subscript: &Script,
    spent_value: u64,
) -> Result<[u8; 32], TransactionError> {
    let preimage = fork_id_preimage(tx, scope, input_index, subscript, spent_value)?;
    Ok(reversed(sha256d(&preimage)))
}

fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = KasWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        writer.write_reversed(&input.previous_tx_id);
        writer.write_u32_le(input.output_index);
    }
    sha256d(writer.as_bytes())
}

fn sequence_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = KasWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence_number as u32);
    }
    sha256d(writer.as_bytes())
}

fn outputs_hash(outputs: &[Output]) -> [u8; 32] {
    let mut writer = KasWriter::new();
    for output in outputs {
        output.write_to(&mut writer);
    }
    sha256d(writer.as_bytes())
}

// -----------------------------------------------------------------------
// Full-copy digest
// -----------------------------------------------------------------------

/// Serialize the modified transaction copy followed by the scope (i32).
///
/// # Returns
/// `Ok(None)` when SIGHASH_SINGLE has no output at `input_index`, in
/// which case the caller signs the fixed sentinel instead.
pub fn full_copy_preimage(
    tx: &Transaction,
    scope: SignatureScope,
    input_index: usize,
    subscript: &Script,
) -> Result<Option<Vec<u8>>, TransactionError> {
    tx.input(input_index)?;
    let subscript = subscript.remove_code_separators()?;

    let mut inputs: Vec<Input> = tx
        .inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let script = if i == input_index {
                subscript.clone()
            } else {
                Script::new()
            };
            input.detached_with_script(script)
        })
        .collect();

    if scope.is_none() || scope.is_single() {
        for (i, input) in inputs.iter_mut().enumerate() {
            if i != input_index {
                input.sequence_number = 0;
            }
        }
    }

    let outputs = if scope.is_none() {
        Vec::new()
    } else if scope.is_single() {
        if input_index >= tx.outputs.len() {
            return Ok(None);
        }
        let mut outputs = vec![Output::new(u64::MAX, Script::new()); input_index];
        outputs.push(tx.outputs[input_index].clone());
        outputs
    } else {
        tx.outputs.clone()
    };

    if scope.has_anyone_can_pay() {
        inputs = vec![inputs.swap_remove(input_index)];
    }

    let copy = Transaction {
        version: tx.version,
        inputs,
        outputs,
        lock_time: tx.lock_time,
    };

    let mut writer = KasWriter::with_capacity(copy.size() + 4);
    copy.write_to(&mut writer);
    writer.write_i32_le(scope.value() as i32);
    Ok(Some(writer.into_bytes()))
}

fn full_copy_hash(
    tx: &Transaction,
    scope: SignatureScope,
    input_index: usize,
    subscript: &Script,
) -> Result<[u8; 32], TransactionError> {
    match full_copy_preimage(tx, scope, input_index, subscript)? {
        Some(preimage) => Ok(reversed(sha256d(&preimage))),
        None => {
            warn!(
                input_index,
                outputs = tx.outputs.len(),
                "SIGHASH_SINGLE without a matching output, signing the fixed sentinel"
            );
            Ok(SIGHASH_SINGLE_BUG)
        }
    }
}

fn reversed(mut digest: [u8; 32]) -> [u8; 32] {
    digest.reverse();
    digest
}
