//! `// META:` directive extraction for script tests.
//!
//! Script tests carry out-of-band configuration (global flavor, timeout
//! class, title, extra scripts) in a leading block of comment lines of the
//! form `// META: key=value`. The block is strictly leading and contiguous:
//! scanning halts at the first line that is not a META directive, so
//! malformed or absent metadata simply yields a shorter (or empty) list
//! rather than an error.

/// A single `(key, value)` metadata pair, in file order.
pub type MetaEntry = (String, String);

/// Extract the leading contiguous block of `// META: key=value` directives
/// from `source`.
pub fn read_script_metadata(source: &str) -> Vec<MetaEntry> {
    let mut entries = Vec::new();
    for line in source.lines() {
        match parse_meta_line(line) {
            Some(entry) => entries.push(entry),
            None => break,
        }
    }
    entries
}

/// Find the first `global` directive in a metadata list.
pub fn first_global(entries: &[MetaEntry]) -> Option<&str> {
    entries
        .iter()
        .find(|(key, _)| key == "global")
        .map(|(_, value)| value.as_str())
}

/// Find the last `global` directive in a metadata list.
///
/// Classification and the wrapper exposure check disagree on precedence
/// when a file repeats the directive; each caller picks its variant.
pub fn last_global(entries: &[MetaEntry]) -> Option<&str> {
    entries
        .iter()
        .rev()
        .find(|(key, _)| key == "global")
        .map(|(_, value)| value.as_str())
}

/// Parse one line as a META directive: `//`, optional whitespace, `META:`,
/// optional whitespace, a (possibly empty) word-character key, `=`, and the
/// rest of the line as the value.
fn parse_meta_line(line: &str) -> Option<MetaEntry> {
    // The directive may start at any `//` in the line; take the leftmost
    // occurrence that parses fully.
    for (start, _) in line.match_indices("//") {
        if let Some(entry) = parse_meta_tail(&line[start + 2..]) {
            return Some(entry);
        }
    }
    None
}

fn parse_meta_tail(tail: &str) -> Option<MetaEntry> {
    let tail = tail.trim_start();
    let tail = tail.strip_prefix("META:")?;
    let tail = tail.trim_start();

    let key_len = tail
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    let key = &tail[..key_len];
    let rest = &tail[key_len..];

    let value = rest.strip_prefix('=')?;
    Some((key.to_string(), value.to_string()))
}

/// Word characters as the directive syntax defines keys (ASCII-only).
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ============================================================================
// TESTS
// ============================================================================
