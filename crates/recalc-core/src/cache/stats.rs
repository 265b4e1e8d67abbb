use serde::Serialize;
use std::time::Duration;

/// Counters for cache effectiveness. `entries` is the current size and
/// `max_size`/`ttl` echo the store's configuration; the rest are cumulative
/// since the last [`reset`](CacheStats::reset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub max_size: usize,
    pub ttl: Duration,
}

impl CacheStats {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, n: u64) {
        self.evictions += n;
    }

    /// Hits over total lookups; 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn reset(&mut self) {
        *self = CacheStats {
            entries: self.entries,
            max_size: self.max_size,
            ttl: self.ttl,
            ..CacheStats::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_reset_keeps_entry_count_and_config() {
        let mut stats = CacheStats {
            hits: 5,
            misses: 3,
            evictions: 1,
            entries: 7,
            max_size: 10,
            ttl: Duration::from_secs(60),
        };
        stats.reset();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.entries, 7);
        assert_eq!(stats.max_size, 10);
        assert_eq!(stats.ttl, Duration::from_secs(60));
    }
}
