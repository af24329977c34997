//! Typed client for the push zone provider's REST API.
//!
//! Layout: `rate_limit.rs` (persisted rolling-window quota), `redact.rs`
//! (diagnostic scrubbing), `error.rs` (`ApiError`), with `client.rs` hosting
//! the [`PushZoneClient`] that issues push and purge requests.
//!
//! Every outbound call is gated by the rate limiter and bounded by a fixed
//! timeout; no retry happens inside this crate. Failures degrade to a typed
//! error the caller logs and absorbs.
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

pub mod client;
pub mod error;
pub mod rate_limit;
pub mod redact;

pub use client::PushZoneClient;
pub use error::{ApiError, ApiResult};
pub use rate_limit::{RATE_LIMIT_KEY, RateLimiter};
