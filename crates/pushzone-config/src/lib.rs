//! Settings model and configuration facade for the push pipeline.
//!
//! Layout: `model.rs` (the aggregate settings blob, `DirectoryPolicy`, and
//! the extension/MIME vocabulary), `credentials.rs` (credential resolution
//! precedence), with `service.rs` hosting the [`SettingsStore`] facade over
//! the durable key-value store.
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

pub mod credentials;
pub mod model;
pub mod service;

pub use credentials::{CredentialOverrides, Credentials, ENV_API_KEY, ENV_PUSH_ZONE_ID};
pub use model::{CustomDirectory, DirectoryPolicy, Settings, mime_type_for};
pub use service::SettingsStore;
