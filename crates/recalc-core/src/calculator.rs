//! The evaluation front door: cache lookup, snapshot access, precise
//! evaluation with fallback, cache write-back.

use recalc_engine::engine::{Scalar, create_engine, evaluate_precise};
use recalc_engine::fallback::evaluate_fallback;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::{CacheKey, CacheStats, FormulaCache};
use crate::error::{EvalError, Result};
use crate::snapshot::SnapshotCache;
use crate::source::CellSource;

#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    pub max_size: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_size: 100,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// One evaluation outcome plus bookkeeping callers tend to display.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub value: Scalar,
    pub cached: bool,
    pub execution_time_ms: f64,
    pub stats: CacheStats,
}

/// Shared-state coordinator. Cloning yields a handle to the same caches.
///
/// The result cache and the snapshot store are locked independently, so two
/// threads racing on the same cold formula may both compute it; both writes
/// store the same value, so the race only costs the duplicate work.
#[derive(Clone)]
pub struct Calculator {
    cache: Arc<Mutex<FormulaCache>>,
    snapshots: Arc<Mutex<SnapshotCache>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Calculator {
    pub fn new(config: CacheConfig) -> Self {
        Calculator {
            cache: Arc::new(Mutex::new(FormulaCache::new(config.max_size, config.ttl))),
            snapshots: Arc::new(Mutex::new(SnapshotCache::new(config.ttl))),
        }
    }

    /// Evaluate `formula` against `source`, serving from the cache when a
    /// fresh result exists.
    pub fn evaluate(
        &self,
        source: &dyn CellSource,
        formula: &str,
        sheet: Option<&str>,
    ) -> Result<Evaluation> {
        let started = Instant::now();

        let text = formula.trim();
        let text = text.strip_prefix('=').unwrap_or(text).trim();
        if text.is_empty() {
            return Err(EvalError::EmptyFormula);
        }

        let mtime = source.modified()?;
        let key = CacheKey::new(source.path(), text, sheet);

        // Bind the lookup before branching: an `if let` scrutinee would keep
        // the cache guard alive into the then-block, and `finish` takes the
        // same lock again for the stats snapshot.
        let hit = lock(&self.cache).get(&key, mtime);
        if let Some(value) = hit {
            return Ok(self.finish(value, true, started));
        }

        let grid = lock(&self.snapshots).get_or_create(source, sheet)?;
        let engine = create_engine(grid.clone());

        let value = match evaluate_precise(&engine, text) {
            Ok(value) => value,
            Err(precise_err) => {
                debug!(formula = text, error = %precise_err, "precise path rejected formula");
                match evaluate_fallback(text, &grid)? {
                    Some(value) => value,
                    None => return Err(EvalError::Unsupported(text.to_string())),
                }
            }
        };

        lock(&self.cache).put(key, value.clone(), mtime);
        Ok(self.finish(value, false, started))
    }

    /// Drop cached results and the snapshot for one file.
    pub fn invalidate(&self, source: &dyn CellSource) {
        lock(&self.cache).invalidate_file(source.path());
        lock(&self.snapshots).release_file(source.path());
    }

    /// Drop everything: results, counters, snapshots.
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
        lock(&self.snapshots).release_all();
    }

    pub fn stats(&self) -> CacheStats {
        lock(&self.cache).stats()
    }

    fn finish(&self, value: Scalar, cached: bool, started: Instant) -> Evaluation {
        Evaluation {
            value,
            cached,
            execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            stats: self.stats(),
        }
    }
}
