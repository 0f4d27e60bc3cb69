//! Global-variant vocabulary for multi-global tests.
//!
//! A multi-global script declares the execution-context flavors it runs
//! under via `// META: global=...`, a comma-separated token list. Tokens add
//! variants, `!`-prefixed tokens remove them, and the whole expansion starts
//! from a default set. Each surviving variant maps to a filename suffix that
//! replaces the script extension when the canonical test URL is derived.

use std::collections::BTreeSet;

/// One row of the variant vocabulary.
///
/// `expands_to` lists the concrete variants a token stands for (a token may
/// be shorthand for several); `suffix` is the fixed URL suffix when the
/// variant is concrete. Variants without a fixed suffix derive one from
/// their name.
struct VariantDef {
    name: &'static str,
    suffix: Option<&'static str>,
    expands_to: &'static [&'static str],
}

/// Worker flavors are not supported by the runner, so the vocabulary only
/// carries the window-like variants and the shell flavor.
const VARIANTS: &[VariantDef] = &[
    VariantDef {
        name: "default",
        suffix: None,
        expands_to: &["window"],
    },
    VariantDef {
        name: "window",
        suffix: Some(".any.html"),
        expands_to: &["window"],
    },
    VariantDef {
        name: "jsshell",
        suffix: Some(".any.js"),
        expands_to: &["jsshell"],
    },
];

/// The infix a multi-global filename carries between base name and extension.
const MULTI_GLOBAL_INFIX: &str = ".any.";

/// The infix marking a secure-context test filename.
const SECURE_CONTEXT_INFIX: &str = ".https.";

fn variant_def(name: &str) -> Option<&'static VariantDef> {
    VARIANTS.iter().find(|def| def.name == name)
}

/// The concrete variants a single (non-negated) token stands for.
/// Unrecognized tokens expand to nothing.
fn token_variants(token: &str) -> &'static [&'static str] {
    variant_def(token).map(|def| def.expands_to).unwrap_or(&[])
}

fn default_variants() -> BTreeSet<&'static str> {
    token_variants("default").iter().copied().collect()
}

/// Expand a comma-separated `global` value into the surviving variant set.
///
/// Starts from the default set; plain tokens add their variants, `!`-prefixed
/// tokens remove theirs. Unrecognized tokens (including all worker flavors)
/// are no-ops.
pub fn parse_variants(value: &str) -> BTreeSet<&'static str> {
    let mut globals = default_variants();
    for token in value.split(',') {
        let token = token.trim();
        if let Some(negated) = token.strip_prefix('!') {
            for &variant in token_variants(negated) {
                globals.remove(variant);
            }
        } else {
            for &variant in token_variants(token) {
                globals.insert(variant);
            }
        }
    }
    globals
}

/// The filename suffixes selected by a `global` value, one per surviving
/// variant. A variant without a fixed suffix derives `.any.<name>.html`.
pub fn global_suffixes(value: &str) -> Vec<String> {
    parse_variants(value)
        .iter()
        .map(|name| match variant_def(name).and_then(|def| def.suffix) {
            Some(suffix) => suffix.to_string(),
            None => format!(".any.{name}.html"),
        })
        .collect()
}

/// Rewrite a multi-global script URL into the canonical URL for one variant
/// suffix: collapse the multi-global infix, collapse a duplicated
/// secure-context infix, then swap the script extension for the suffix.
pub fn global_variant_url(url: &str, suffix: &str) -> String {
    let mut url = url.replacen(MULTI_GLOBAL_INFIX, ".", 1);
    // A secure-context suffix already carries the infix; keep it single.
    if url.contains(SECURE_CONTEXT_INFIX) && suffix.starts_with(SECURE_CONTEXT_INFIX) {
        url = url.replacen(SECURE_CONTEXT_INFIX, ".", 1);
    }
    replace_end(&url, ".js", suffix)
}

/// Replace the trailing `old` suffix of `s` with `new`.
///
/// Callers guarantee the suffix is present.
pub(crate) fn replace_end(s: &str, old: &str, new: &str) -> String {
    let head = s
        .strip_suffix(old)
        .expect("INVARIANT: caller checked the suffix");
    format!("{head}{new}")
}

// ============================================================================
// TESTS
// ============================================================================
