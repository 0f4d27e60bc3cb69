//! Test discovery vocabulary: naming convention, metadata, variants.
//!
//! ## Modules
//!
//! - `metadata` - `// META:` leading-block extraction
//! - `variants` - global-variant table and URL derivation
//! - `source_file` - per-file classification and TestURL expansion

pub mod metadata;
pub mod source_file;
pub mod variants;

pub use metadata::{MetaEntry, read_script_metadata};
pub use source_file::SourceFile;
pub use variants::{global_suffixes, global_variant_url, parse_variants};
