//! Process-wide identity allocation for long-lived proxies.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque correlation key for a long-lived proxied object.
///
/// Allocated once when a statement or result-set proxy is constructed and
/// never reused for the lifetime of the process, so telemetry consumers can
/// group events by the object they happened on. Carries no meaning beyond
/// equality and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate the next identity. Safe to call from any thread.
    pub fn next() -> Self {
        ObjectId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
