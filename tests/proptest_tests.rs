//! Property-based tests.
//!
//! Name normalization laws and payload round-trips over generated input.

mod common;

use proptest::prelude::*;

use pck::name::{self, normalize};
use pck::{Archive, EntryName};

use common::Scratch;

/// Names built from path-ish characters, including separators of both kinds.
fn messy_name() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just("/".to_string()),
            Just("\\".to_string()),
            Just(" ".to_string()),
            "[a-zA-Z0-9._-]{1,6}",
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_normalize_is_idempotent(raw in messy_name()) {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn prop_normalized_names_are_canonical(raw in messy_name()) {
        let n = normalize(&raw);
        prop_assert!(!n.contains('/'));
        prop_assert!(!n.contains("\\\\"));
        prop_assert!(!n.starts_with('\\') && !n.ends_with('\\'));
        prop_assert!(!n.starts_with(' ') && !n.ends_with(' '));
    }

    #[test]
    fn prop_lookup_ignores_case_and_separator_style(raw in "[a-z]{1,5}(/[a-z]{1,5}){0,3}") {
        let entry = EntryName::new(&raw).unwrap();
        prop_assert!(entry.matches(&raw.to_uppercase()));
        prop_assert!(entry.matches(&raw.replace('/', "\\\\")));
        prop_assert!(name::names_equal(entry.as_str(), &normalize(&raw.to_ascii_uppercase())));
    }

    #[test]
    fn prop_encode_decode_names(raw in "[a-zA-Z0-9_]{1,8}(\\\\[a-zA-Z0-9_]{1,8}){0,3}") {
        let bytes = name::encode(&raw).unwrap();
        let (decoded, lossy) = name::decode(&bytes);
        prop_assert!(!lossy);
        prop_assert_eq!(decoded, raw);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_payloads_round_trip(
        payloads in proptest::collection::vec(
            prop_oneof![
                proptest::collection::vec(any::<u8>(), 0..2048),
                (1usize..4096).prop_map(|n| vec![b'z'; n]),
            ],
            1..8,
        )
    ) {
        let scratch = Scratch::new("prop.pck");
        let names: Vec<String> = (0..payloads.len()).map(|i| format!("p\\{}.bin", i)).collect();
        let entries: Vec<(&str, &[u8])> = names
            .iter()
            .zip(&payloads)
            .map(|(n, d)| (n.as_str(), d.as_slice()))
            .collect();
        let archive = common::create_archive(&scratch.path, &entries).unwrap();
        common::assert_stats_balance(&archive);
        drop(archive);

        let reopened = Archive::open(&scratch.path).unwrap();
        for ((name, data), entry) in entries.iter().zip(reopened.entries()) {
            prop_assert_eq!(entry.name(), *name);
            prop_assert_eq!(&reopened.read(entry).unwrap(), data);
            prop_assert!(entry.compressed_size <= entry.size);
        }
    }
}

#[test]
fn test_normalize_collapses_mixed_separators() {
    assert_eq!(normalize("//abc\\\\//123.txt"), "abc\\123.txt");
    assert_eq!(normalize("  \\a\\ "), "a");
    assert_eq!(normalize(""), "");
}
