//! Directory scanning for the push pipeline.
//!
//! Layout: `manifest.rs` (the ordered file list), `policy.rs` (directory
//! eligibility and exclusion matching), `scanner.rs` (the cached walk and
//! chunk slicing), `validate.rs` (per-file upload validation).
//!
//! The scanner owns the manifest: it is produced by one depth-first walk,
//! cached as a unit with a TTL, and read-only to every consumer. Chunk
//! slicing never re-orders it.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

pub mod manifest;
pub mod policy;
pub mod scanner;
pub mod validate;

pub use manifest::{FileManifest, FileRecord};
pub use policy::PolicyMatcher;
pub use scanner::{FILES_COUNT_KEY, FILES_LIST_KEY, MANIFEST_CACHE_TTL, Scanner};
pub use validate::{FileValidator, MAX_FILE_SIZE_BYTES, ValidationError};
