//! Property tests for the hash functions.

use proptest::prelude::*;

use bronze_transform::{attribute_hash, business_key_hash, md5_hex};

fn key_value() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("  ".to_string())),
        "[A-Z]{1,4}".prop_map(Some),
    ]
}

proptest! {
    #[test]
    fn prop_hash_is_lowercase_md5_hex(values in prop::collection::vec(key_value(), 1..5)) {
        let hash = business_key_hash(&values);
        prop_assert_eq!(hash.len(), 32);
        prop_assert!(hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn prop_all_blank_keys_hash_to_repeated_sentinel(
        values in prop::collection::vec(
            prop_oneof![Just(None), Just(Some(String::new())), Just(Some(" ".to_string()))],
            1..6,
        )
    ) {
        let expected = md5_hex(&vec!["-1"; values.len()].join("#"));
        prop_assert_eq!(business_key_hash(&values), expected);
    }

    #[test]
    fn prop_non_blank_key_disables_sentinel(
        key in "[A-Z]{3}",
        nulls in 0usize..4,
    ) {
        let mut values: Vec<Option<String>> = vec![None; nulls];
        values.push(Some(key.clone()));
        prop_assert_eq!(business_key_hash(&values), md5_hex(&key));
    }

    #[test]
    fn prop_attribute_hash_is_order_sensitive(a in "[a-z]{1,6}", b in "[a-z]{1,6}") {
        prop_assume!(a != b);
        let forward = attribute_hash(&[Some(a.as_str()), Some(b.as_str())]);
        let reverse = attribute_hash(&[Some(b.as_str()), Some(a.as_str())]);
        prop_assert_ne!(forward, reverse);
    }

    #[test]
    fn prop_attribute_change_changes_hash(
        base in prop::collection::vec("[a-z0-9]{0,5}", 1..6),
        idx in any::<prop::sample::Index>(),
        replacement in "[A-Z]{1,3}",
    ) {
        let original: Vec<Option<&str>> = base.iter().map(|v| Some(v.as_str())).collect();
        let mut changed = original.clone();
        let i = idx.index(base.len());
        changed[i] = Some(replacement.as_str());
        prop_assert_ne!(attribute_hash(&original), attribute_hash(&changed));
    }
}

#[test]
fn blank_iata_code_hashes_to_sentinel() {
    assert_eq!(
        business_key_hash(&[Some("")]),
        "6bb61e3b7bce0931da574d19d1d82c88"
    );
}
