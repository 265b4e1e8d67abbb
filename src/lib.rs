//! recalc - cached spreadsheet formula evaluation over CSV sources.
//!
//! Thin facade over [`recalc_core`]; the binary and integration tests use
//! these re-exports.

pub use recalc_core::{
    CacheConfig, CacheKey, CacheStats, Calculator, CellSource, CsvSource, EvalError, Evaluation,
    FormulaCache, Result, Scalar, SheetRegion, SnapshotCache,
};
