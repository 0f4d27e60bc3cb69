//! Property-based tests for the path resolver and the discovery vocabulary.
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::path::Path;

use proptest::prelude::*;

use wptrun::harness::variants::global_variant_url;
use wptrun::server::path::{filesystem_path, percent_decode};
use wptrun::{parse_variants, read_script_metadata};

// =============================================================================
// Path Resolver Properties
// =============================================================================

/// Percent-encode every byte of `input`; decoding must round-trip.
fn encode_all(input: &str) -> String {
    input.bytes().map(|b| format!("%{b:02x}")).collect()
}

proptest! {
    /// Property: a resolved path never escapes the base directory.
    #[test]
    fn resolved_path_stays_under_base(url_path in "[ -~]{0,40}") {
        let base = Path::new("/served/root");
        if let Ok(resolved) = filesystem_path(base, &url_path, "/") {
            prop_assert!(resolved.starts_with(base));
        }
    }

    /// Property: any path spelling out a parent segment is rejected.
    #[test]
    fn parent_segments_always_rejected(
        prefix in "[a-z/]{0,10}",
        suffix in "[a-z/]{0,10}",
    ) {
        let url_path = format!("/{prefix}../{suffix}");
        prop_assert!(filesystem_path(Path::new("/base"), &url_path, "/").is_err());
    }

    /// Property: fully percent-encoded text decodes back to the original.
    #[test]
    fn percent_decoding_round_trips(text in "[a-zA-Z0-9 /._-]{0,30}") {
        prop_assert_eq!(percent_decode(&encode_all(&text)).unwrap(), text);
    }
}

// =============================================================================
// Metadata Properties
// =============================================================================

proptest! {
    /// Property: a well-formed leading block parses back entry for entry,
    /// and scanning never reads past the first non-directive line.
    #[test]
    fn leading_block_parses_exactly(
        entries in prop::collection::vec(("[a-z_][a-z0-9_]{0,8}", "[a-zA-Z0-9 ,.&!<>-]{0,12}"), 0..5),
        junk in "[a-z(){} ;]{0,20}",
    ) {
        let mut source = String::new();
        for (key, value) in &entries {
            source.push_str(&format!("// META: {key}={value}\n"));
        }
        source.push_str(&format!("{junk}\n// META: late=ignored\n"));

        let parsed = read_script_metadata(&source);
        // The junk line may not itself look like a directive.
        prop_assume!(!junk.contains("//"));
        prop_assert_eq!(parsed.len(), entries.len());
        for ((key, value), (pk, pv)) in entries.iter().zip(parsed.iter()) {
            prop_assert_eq!(key, pk);
            prop_assert_eq!(value, pv);
        }
    }
}

// =============================================================================
// Variant Properties
// =============================================================================

proptest! {
    /// Property: the surviving variant set only ever contains known names.
    #[test]
    fn variants_are_drawn_from_the_vocabulary(value in "[a-z!, ]{0,30}") {
        for variant in parse_variants(&value) {
            prop_assert!(variant == "window" || variant == "jsshell");
        }
    }

    /// Property: a derived multi-global URL keeps its directory and swaps
    /// the suffix.
    #[test]
    fn variant_url_keeps_directory(name in "[a-z][a-z0-9_-]{0,10}", dir in "[a-z]{1,6}") {
        let url = format!("{dir}/{name}.any.js");
        let derived = global_variant_url(&url, ".any.html");
        prop_assert_eq!(derived, format!("{dir}/{name}.any.html"));
    }
}
