//! Classification of discovered files into runnable test URLs.
//!
//! The naming convention encodes a file's test format in dot-separated
//! tokens between the base name and the final extension: `foo.any.js` is a
//! multi-global script, `bar.window.js` a window-only script,
//! `baz.worker.js` a worker script (unsupported), and markup files are
//! testharness content served as-is. A classified file expands into zero,
//! one, or many canonical test URLs.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use super::metadata::{self, MetaEntry};
use super::variants::{global_suffixes, global_variant_url, replace_end};

/// Extensions treated as scripts for classification purposes.
const SCRIPT_EXT: &str = ".js";

/// Extensions treated as testharness markup content.
const MARKUP_EXTS: &[&str] = &[".html", ".xhtml"];

/// A discovered file under the test root, classified by naming convention.
///
/// Constructed once per file and immutable afterwards; the file contents are
/// read lazily on first use and cached for the rest of the run.
#[derive(Debug)]
pub struct SourceFile {
    tests_root: PathBuf,
    rel_path: String,
    filename: String,
    ext: String,
    meta_flags: Vec<String>,
    contents: OnceLock<String>,
}

impl SourceFile {
    /// Classify `rel_path` (relative to `tests_root`, any separator style).
    pub fn new(tests_root: impl Into<PathBuf>, rel_path: &str) -> Self {
        let rel_path = rel_path.replace('\\', "/");
        let filename = rel_path
            .rsplit('/')
            .next()
            .unwrap_or(rel_path.as_str())
            .to_string();
        let ext = match filename.rfind('.') {
            // A leading dot is a hidden-file marker, not an extension.
            Some(pos) if pos > 0 => filename[pos..].to_string(),
            _ => String::new(),
        };
        let base_name = &filename[..filename.len() - ext.len()];
        let meta_flags = base_name.split('.').skip(1).map(str::to_string).collect();

        Self {
            tests_root: tests_root.into(),
            rel_path,
            filename,
            ext,
            meta_flags,
            contents: OnceLock::new(),
        }
    }

    /// The path relative to the test root, forward-slash separated.
    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    /// The filename component.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The dot-separated tokens between base name and extension.
    pub fn meta_flags(&self) -> &[String] {
        &self.meta_flags
    }

    /// The location of the file on disk.
    pub fn path(&self) -> PathBuf {
        self.tests_root.join(&self.rel_path)
    }

    /// Read the file, caching the contents for subsequent calls.
    pub fn open(&self) -> io::Result<&str> {
        if let Some(contents) = self.contents.get() {
            return Ok(contents);
        }
        let text = fs::read_to_string(self.path())?;
        Ok(self.contents.get_or_init(|| text))
    }

    /// Script intended to run under several execution-context flavors.
    pub fn name_is_multi_global(&self) -> bool {
        self.has_flag("any") && self.ext == SCRIPT_EXT
    }

    /// Worker-only script (yields no test URLs; workers are unsupported).
    pub fn name_is_worker(&self) -> bool {
        self.has_flag("worker") && self.ext == SCRIPT_EXT
    }

    /// Window-only script.
    pub fn name_is_window(&self) -> bool {
        self.has_flag("window") && self.ext == SCRIPT_EXT
    }

    /// Markup content that loads the harness itself.
    pub fn content_is_testharness(&self) -> bool {
        MARKUP_EXTS.contains(&self.ext.as_str())
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.meta_flags.iter().any(|f| f == flag)
    }

    /// The `// META:` block of a script-classified file.
    ///
    /// Non-script files have no metadata channel and yield an empty list.
    pub fn script_metadata(&self) -> io::Result<Vec<MetaEntry>> {
        if self.name_is_worker() || self.name_is_multi_global() || self.name_is_window() {
            Ok(metadata::read_script_metadata(self.open()?))
        } else {
            Ok(Vec::new())
        }
    }

    /// Expand this file into its canonical test URLs (zero, one, or many).
    pub fn test_paths(&self) -> io::Result<Vec<String>> {
        let mut paths = Vec::new();
        if self.name_is_multi_global() {
            let entries = self.script_metadata()?;
            let globals = metadata::first_global(&entries).unwrap_or("");
            for suffix in global_suffixes(globals) {
                paths.push(global_variant_url(&self.rel_path, &suffix));
            }
        } else if self.name_is_worker() {
            // Worker tests are not supported.
        } else if self.name_is_window() {
            paths.push(replace_end(&self.rel_path, ".window.js", ".window.html"));
        } else if self.content_is_testharness() {
            paths.push(self.rel_path.clone());
        }
        Ok(paths)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(rel_path: &str) -> SourceFile {
        SourceFile::new("/nonexistent", rel_path)
    }

    #[test]
    fn test_meta_flags_split() {
        let file = classify("dom/foo.any.js");
        assert_eq!(file.filename(), "foo.any.js");
        assert_eq!(file.meta_flags(), ["any"]);

        let file = classify("a/b.https.any.js");
        assert_eq!(file.meta_flags(), ["https", "any"]);

        let file = classify("plain.html");
        assert!(file.meta_flags().is_empty());
    }

    #[test]
    fn test_classification_predicates() {
        assert!(classify("x/foo.any.js").name_is_multi_global());
        assert!(classify("x/foo.window.js").name_is_window());
        assert!(classify("x/foo.worker.js").name_is_worker());
        assert!(classify("x/foo.html").content_is_testharness());
        assert!(classify("x/foo.xhtml").content_is_testharness());

        // Flags only count on scripts.
        assert!(!classify("x/foo.any.html").name_is_multi_global());
        // Helpers without flags are nothing.
        let helper = classify("resources/util.js");
        assert!(!helper.name_is_multi_global());
        assert!(!helper.name_is_window());
        assert!(!helper.name_is_worker());
        assert!(!helper.content_is_testharness());
    }

    #[test]
    fn test_backslash_paths_are_normalized() {
        let file = classify("dom\\nodes\\foo.any.js");
        assert_eq!(file.rel_path(), "dom/nodes/foo.any.js");
        assert_eq!(file.filename(), "foo.any.js");
    }

    #[test]
    fn test_window_script_expands_to_one_url() {
        let paths = classify("a/bar.window.js").test_paths().unwrap();
        assert_eq!(paths, vec!["a/bar.window.html".to_string()]);
    }

    #[test]
    fn test_markup_expands_to_itself() {
        let paths = classify("a/page.html").test_paths().unwrap();
        assert_eq!(paths, vec!["a/page.html".to_string()]);
    }

    #[test]
    fn test_worker_script_expands_to_nothing() {
        assert!(classify("a/baz.worker.js").test_paths().unwrap().is_empty());
    }

    #[test]
    fn test_helper_script_expands_to_nothing() {
        assert!(classify("resources/util.js").test_paths().unwrap().is_empty());
    }

    #[test]
    fn test_hidden_file_has_no_extension() {
        let file = classify("sub/.eslintrc");
        assert!(!file.content_is_testharness());
        assert!(file.test_paths().unwrap().is_empty());
    }
}
