//! Opcode values used by the standard templates and by signature hashing.
//!
//! Only the opcodes this crate interprets are named here. Everything else
//! is carried through as an opaque byte.

pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = OP_0;
pub const OP_DATA_1: u8 = 0x01;
pub const OP_DATA_20: u8 = 0x14;
pub const OP_DATA_32: u8 = 0x20;
pub const OP_DATA_33: u8 = 0x21;
pub const OP_DATA_75: u8 = 0x4b;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = OP_1;
pub const OP_16: u8 = 0x60;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CODESEPARATOR: u8 = 0xab;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

/// Maximum number of keys a bare multisig script may carry.
pub const MAX_MULTISIG_KEYS: usize = 16;

/// Sig-op weight of an un-analysed OP_CHECKMULTISIG.
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// Check whether `op` pushes a small integer (OP_0, OP_1..OP_16).
pub fn is_small_int_op(op: u8) -> bool {
    op == OP_0 || (OP_1..=OP_16).contains(&op)
}

/// The integer pushed by a small-int opcode.
///
/// Returns `None` for anything other than OP_0 and OP_1..OP_16.
pub fn small_int_value(op: u8) -> Option<usize> {
    match op {
        OP_0 => Some(0),
        OP_1..=OP_16 => Some((op - OP_1 + 1) as usize),
        _ => None,
    }
}

/// The opcode that pushes `n`, for `n` in 0..=16.
pub fn small_int_op(n: usize) -> Option<u8> {
    match n {
        0 => Some(OP_0),
        1..=16 => Some(OP_1 + (n as u8) - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_ints() {
        assert!(is_small_int_op(OP_0));
        assert!(is_small_int_op(OP_16));
        assert!(!is_small_int_op(OP_1NEGATE));
        assert!(!is_small_int_op(OP_DATA_1));

        for n in 0..=16 {
            let op = small_int_op(n).unwrap();
            assert_eq!(small_int_value(op), Some(n));
        }
        assert_eq!(small_int_op(17), None);
        assert_eq!(small_int_value(OP_CHECKSIG), None);
    }
}
