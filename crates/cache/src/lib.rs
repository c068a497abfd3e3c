#![warn(clippy::unwrap_used)]

pub mod clock;
pub mod local;

pub use clock::{Clock, ManualClock, SystemClock};
pub use local::LocalCache;

use std::time::Duration;

/// Cache seam used by request handlers. Implementations decide where the
/// entries live; callers only see get/set with a per-entry TTL.
pub trait ReportCache<K, V>: Send + Sync {
    /// Returns `None` when the key is missing or its entry has expired.
    fn get(&self, key: &K) -> Option<V>;

    fn set(&self, key: K, value: V, ttl: Duration);
}
