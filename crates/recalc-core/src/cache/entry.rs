use recalc_engine::engine::Scalar;
use std::time::{Duration, Instant, SystemTime};

/// A cached result plus the metadata needed to judge its freshness.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub value: Scalar,
    pub created_at: Instant,
    pub last_access: Instant,
    pub access_count: u64,
    /// Source file mtime observed when the value was computed.
    pub source_mtime: SystemTime,
}

impl CacheEntry {
    pub fn new(value: Scalar, source_mtime: SystemTime) -> Self {
        let now = Instant::now();
        CacheEntry {
            value,
            created_at: now,
            last_access: now,
            access_count: 0,
            source_mtime,
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }

    /// Stale when the file on disk no longer has the mtime the value was
    /// computed against. Both directions count: a restored backup moves
    /// mtime backwards.
    pub fn is_stale(&self, current_mtime: SystemTime) -> bool {
        self.source_mtime != current_mtime
    }

    pub fn touch(&mut self) {
        self.last_access = Instant::now();
        self.access_count += 1;
    }
}
