use recalc_engine::engine::Scalar;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

use super::entry::CacheEntry;
use super::key::CacheKey;
use super::stats::CacheStats;

/// Bounded formula result cache. Not synchronized; callers wrap it in a lock.
#[derive(Debug)]
pub struct FormulaCache {
    entries: HashMap<CacheKey, CacheEntry>,
    stats: CacheStats,
    max_size: usize,
    ttl: Duration,
}

impl FormulaCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        FormulaCache {
            entries: HashMap::new(),
            stats: CacheStats::default(),
            max_size: max_size.max(1),
            ttl,
        }
    }

    /// Look up a result. An entry past its TTL or computed against a
    /// different file mtime is removed and counts as a miss.
    pub fn get(&mut self, key: &CacheKey, current_mtime: SystemTime) -> Option<Scalar> {
        let valid = match self.entries.get(key) {
            Some(entry) => !entry.is_expired(self.ttl) && !entry.is_stale(current_mtime),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if !valid {
            self.entries.remove(key);
            self.stats.entries = self.entries.len();
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch();
        self.stats.record_hit();
        Some(entry.value.clone())
    }

    /// Store a result. Sweeps expired entries first, then evicts the least
    /// recently used batch if the store is still full.
    pub fn put(&mut self, key: CacheKey, value: Scalar, source_mtime: SystemTime) {
        self.sweep_expired();
        if self.entries.len() >= self.max_size && !self.entries.contains_key(&key) {
            self.evict_lru();
        }
        self.entries.insert(key, CacheEntry::new(value, source_mtime));
        self.stats.entries = self.entries.len();
    }

    /// Drop every entry computed from `file`, regardless of freshness.
    pub fn invalidate_file(&mut self, file: &Path) {
        self.entries.retain(|key, _| key.file != file);
        self.stats.entries = self.entries.len();
    }

    /// Drop everything and reset the counters. Idempotent.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            max_size: self.max_size,
            ttl: self.ttl,
            ..self.stats
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
        self.stats.entries = self.entries.len();
    }

    /// Evict down to `max_size` minus a headroom of one tenth of the
    /// capacity, so a burst of inserts does not evict one entry at a time.
    /// Victims are ordered by (access_count, last_access) ascending.
    fn evict_lru(&mut self) {
        let target = self.max_size - (self.max_size / 10).max(1);
        if self.entries.len() <= target {
            return;
        }

        let mut candidates: Vec<(CacheKey, u64, std::time::Instant)> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.access_count, e.last_access))
            .collect();
        candidates.sort_by(|a, b| (a.1, a.2).cmp(&(b.1, b.2)));

        let evict = self.entries.len() - target;
        for (key, _, _) in candidates.into_iter().take(evict) {
            self.entries.remove(&key);
        }
        self.stats.record_evictions(evict as u64);
        self.stats.entries = self.entries.len();
        debug!(evicted = evict, remaining = self.entries.len(), "cache eviction");
    }
}
