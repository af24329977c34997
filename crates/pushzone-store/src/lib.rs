//! Injected persistence capabilities for the push pipeline.
//!
//! Every component coordinates exclusively through two stores: a durable,
//! process-wide, string-keyed settings/progress store and a short-lived cache
//! store whose entries expire. Both are modelled as explicit capabilities so
//! tests (and embedders) can substitute in-memory implementations; nothing in
//! the workspace reaches for ambient global state.
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

pub mod memory;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub use memory::{MemoryCache, MemoryKv};

/// Durable, string-keyed store for settings and progress records.
///
/// The backing store is expected to survive process restarts; writes are
/// last-writer-wins with no transactions. The contract is deliberately
/// infallible, matching the hosting platform's option store: a missing key is
/// `None`, and a failing backend is outside this subsystem's error model.
pub trait KvStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove `key` and its value.
    fn delete(&self, key: &str);
}

/// Short-lived cache store supporting set-with-expiry.
///
/// Used for the advisory exclusivity leases and the scan manifest cache.
/// Entries disappear on their own once the TTL elapses; `delete` releases
/// them early.
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key` for at most `ttl`.
    fn set(&self, key: &str, value: &str, ttl: Duration);

    /// Fetch the value stored under `key`, unless it has expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Remove `key` before its TTL elapses.
    fn delete(&self, key: &str);
}

/// Clock capability so time-dependent logic (lease expiry, rate-limit
/// windows, stall detection) stays testable.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fetch and deserialize a JSON record from the durable store.
///
/// An unparseable record is discarded with a warning rather than surfaced as
/// an error; callers fall back to their defaults, the same way the original
/// platform treated a corrupt option value.
pub fn get_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "discarding unparseable stored record");
            None
        }
    }
}

/// Serialize and store a JSON record in the durable store.
pub fn set_json<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(err) => warn!(key, error = %err, "failed to serialize stored record"),
    }
}
