use proptest::prelude::*;

use kaspacore_script::Script;
use kaspacore_transaction::sighash::{compute_signature_hash, ReusedValueCache};
use kaspacore_transaction::{
    Input, InputParams, Output, SighashConfig, SignatureScope, Transaction,
};

/// Strategy for an input with a resolved spent output.
fn arb_input() -> impl Strategy<Value = Input> {
    (
        prop::array::uniform32(any::<u8>()),       // prev tx id
        any::<u32>(),                              // output index
        prop::collection::vec(any::<u8>(), 0..64), // script bytes
        any::<u16>(),                              // script version
        any::<u64>(),                              // sequence
        any::<u64>(),                              // spent value
    )
        .prop_map(|(id, index, script, version, sequence, value)| {
            Input::new(InputParams {
                previous_tx_id: id,
                output_index: index,
                sequence_number: Some(sequence),
                script_version: version,
                script: Some(Script::from_bytes(&script)),
                output: Some(Output::new(value, Script::from_bytes(&[0xac]))),
            })
            .unwrap()
        })
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    let arb_output = (any::<u64>(), prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(value, script)| Output::new(value, Script::from_bytes(&script)));

    (
        any::<u16>(), // version
        prop::collection::vec(arb_input(), 1..5),
        prop::collection::vec(arb_output, 0..5),
        any::<u64>(), // lock time
    )
        .prop_map(|(version, inputs, outputs, lock_time)| Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
}

fn arb_scope() -> impl Strategy<Value = SignatureScope> {
    prop_oneof![Just(0x01u32), Just(0x02), Just(0x03), Just(0x81), Just(0x82), Just(0x83)]
        .prop_map(SignatureScope)
}

fn wire_only(input: &Input) -> Input {
    Input {
        spent_output: None,
        ..input.clone()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn input_roundtrip(input in arb_input()) {
        let bytes = input.to_bytes();
        prop_assert_eq!(bytes.len(), input.estimate_size());
        let parsed = Input::from_bytes(&bytes).unwrap();
        if input.script.is_empty() {
            prop_assert_eq!(input.script_version, 0);
        }
        prop_assert_eq!(parsed, wire_only(&input));
    }

    #[test]
    fn truncated_input_is_rejected(input in arb_input(), cut in 1usize..16) {
        let bytes = input.to_bytes();
        let end = bytes.len().saturating_sub(cut);
        prop_assert!(Input::from_bytes(&bytes[..end]).is_err());
    }

    #[test]
    fn transaction_roundtrip(tx in arb_transaction()) {
        let bytes = tx.to_bytes();
        let parsed = Transaction::from_bytes(&bytes).unwrap();
        prop_assert_eq!(parsed.to_bytes(), bytes);
        prop_assert_eq!(parsed.inputs, tx.inputs.iter().map(wire_only).collect::<Vec<_>>());
        prop_assert_eq!(Transaction::from_hex(&tx.to_hex()).unwrap().tx_id(), tx.tx_id());
    }

    #[test]
    fn cached_digest_is_deterministic(tx in arb_transaction(), scope in arb_scope()) {
        let config = SighashConfig::cached();
        for index in 0..tx.inputs.len() {
            let first = tx.calc_input_signature_hash(index, scope, &config, None).unwrap();
            let second = tx.clone().calc_input_signature_hash(index, scope, &config, None).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn reused_cache_matches_fresh_cache(tx in arb_transaction(), scope in arb_scope()) {
        let config = SighashConfig::cached();
        let reused = ReusedValueCache::new();
        for index in 0..tx.inputs.len() {
            let output = tx.inputs[index].spent_output.clone().unwrap();
            let cached = compute_signature_hash(
                &tx,
                scope,
                index,
                &output.script,
                Some(output.value),
                &config,
                Some(&reused),
            )
            .unwrap();
            let fresh = tx.calc_input_signature_hash(index, scope, &config, None).unwrap();
            prop_assert_eq!(cached, fresh);
        }
    }

    #[test]
    fn legacy_digest_is_deterministic(tx in arb_transaction(), scope in arb_scope()) {
        let config = SighashConfig::legacy();
        for index in 0..tx.inputs.len() {
            let first = tx.calc_input_signature_hash(index, scope, &config, None).unwrap();
            let second = tx.calc_input_signature_hash(index, scope, &config, None).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
