mod common;

use common::*;
use proptest::prelude::*;
use serde_json::{Map, Value};

fn record_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        "[ -~]{0,24}".prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ];
    proptest::collection::btree_map("[a-z][a-z0-9_]{0,10}", leaf, 1..6).prop_map(|fields| {
        Value::Object(fields.into_iter().collect::<Map<String, Value>>())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_sign_then_verify_is_valid(record in record_strategy()) {
        let signed = signer().sign_at(&record, "Payment", None, signing_date()).unwrap();
        let result = verifier().verify(&signed).unwrap();
        prop_assert!(result.is_valid, "{:?}", result.details);
    }

    #[test]
    fn prop_changed_value_is_invalid(record in record_strategy(), extra in "[a-z]{1,8}") {
        let signed = signer().sign_at(&record, "Payment", None, signing_date()).unwrap();
        let tampered = signed.replacen("<Signature ", &format!("<tampered>{extra}</tampered><Signature "), 1);
        let result = verifier().verify(&tampered).unwrap();
        prop_assert!(!result.is_valid);
    }
}
