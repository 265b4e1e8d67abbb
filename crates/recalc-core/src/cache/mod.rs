//! TTL and LRU bounded cache for computed formula results.
//!
//! Entries are keyed by (file, formula, sheet) and carry the source file
//! mtime observed at computation time. An entry stops being served once its
//! TTL elapses or the source file changes on disk; expired entries are also
//! swept opportunistically on writes. When the store is full, the least
//! recently used entries are evicted in a batch.

mod entry;
mod key;
mod stats;
mod store;

pub use entry::CacheEntry;
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::FormulaCache;
