//! Formula result caching and evaluation coordination.
//!
//! This crate wires the evaluation engine to cell sources on disk: a TTL and
//! LRU bounded [`cache::FormulaCache`] for computed results, a
//! [`snapshot::SnapshotCache`] holding in-memory copies of source data, and
//! the [`calculator::Calculator`] front door that checks the cache, builds
//! snapshots and runs the precise-then-fallback evaluation pipeline.

pub mod cache;
pub mod calculator;
pub mod error;
pub mod snapshot;
pub mod source;

pub use cache::{CacheKey, CacheStats, FormulaCache};
pub use calculator::{CacheConfig, Calculator, Evaluation};
pub use error::{EvalError, Result};
pub use recalc_engine::engine::Scalar;
pub use snapshot::SnapshotCache;
pub use source::{CellSource, CsvSource, SheetRegion};
