use depot_storage::naming::sanitize;
use depot_storage::{generate_key, object_path};
use proptest::prelude::*;

/// File-name-like inputs: mixed case words, separators, dots and a few hostile chars.
fn file_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _.\\-/\\\\:*?<>|\"\u{e9}\u{df}\u{130}]{0,80}"
}

/// Names built from cased letters whose case mappings are irregular: Greek letters
/// with iota subscripts (titlecase, multi-char uppercase), Latin digraphs, math
/// alphanumerics that have no case mapping and letters that expand when cased.
fn cased_name() -> impl Strategy<Value = String> {
    let letter = prop_oneof![
        prop::char::range('A', 'z'),
        prop::char::range('\u{1F00}', '\u{1FFF}'),
        prop::char::range('\u{1C4}', '\u{1CC}'),
        prop::char::range('\u{1D400}', '\u{1D4FF}'),
        prop::sample::select(vec![
            ' ', '-', '.', '_', '0', '7', '\u{df}', '\u{130}', '\u{149}', '\u{345}', '\u{1E9E}',
            '\u{3A3}', '\u{3C2}',
        ]),
    ];
    prop::collection::vec(letter, 0..40).prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2048))]

    #[test]
    fn sanitize_is_idempotent(name in any::<String>()) {
        let once = sanitize(&name);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn sanitize_is_idempotent_on_file_names(name in file_name()) {
        let once = sanitize(&name);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn sanitize_is_idempotent_on_irregular_case(name in cased_name()) {
        let once = sanitize(&name);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn sanitized_names_are_safe_segments(name in file_name()) {
        let clean = sanitize(&name);
        prop_assert!(!clean.is_empty());
        prop_assert!(clean.len() <= 255);
        prop_assert!(!clean.contains(['/', '\\']));
        prop_assert!(!clean.contains(['?', '<', '>', ':', '*', '|', '"']));
        prop_assert!(clean != "." && clean != "..");
    }

    #[test]
    fn generated_keys_share_suffix_but_not_token(name in file_name()) {
        let a = generate_key(&name);
        let b = generate_key(&name);
        prop_assert_ne!(&a, &b);
        prop_assert_eq!(a.sanitized_name(), b.sanitized_name());
        prop_assert!(a.is_well_formed());
        prop_assert_eq!(object_path(&a), format!("uploads/{}", a));
    }
}
