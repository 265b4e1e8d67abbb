//! Shared snapshot cell storage.

use super::cell_ref::CellRef;
use super::range::RangeRef;
use super::value::Scalar;
use dashmap::DashMap;
use std::sync::Arc;

/// Snapshot copy window. Ranges beyond this are never materialized.
pub const MAX_SNAPSHOT_ROWS: usize = 1000;
pub const MAX_SNAPSHOT_COLS: usize = 100;

/// Snapshot cell storage (DashMap is internally Arc-based, clones are cheap).
pub type SheetGrid = Arc<DashMap<CellRef, Scalar>>;

pub fn new_grid() -> SheetGrid {
    Arc::new(DashMap::new())
}

/// Numeric cells of a range in row-major order. Text, booleans, dates and
/// empty cells are skipped.
pub fn numeric_values(grid: &SheetGrid, range: &RangeRef) -> Vec<f64> {
    range
        .cells()
        .filter_map(|cell| grid.get(&cell).and_then(|v| v.as_number()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_values_skips_non_numbers() {
        let grid = new_grid();
        grid.insert(CellRef::new(0, 0), Scalar::Number(1.0));
        grid.insert(CellRef::new(0, 1), Scalar::Text("n/a".to_string()));
        grid.insert(CellRef::new(0, 2), Scalar::Number(3.0));
        grid.insert(CellRef::new(0, 3), Scalar::Bool(true));

        let range = RangeRef::parse("A1:A5").unwrap();
        assert_eq!(numeric_values(&grid, &range), vec![1.0, 3.0]);
    }

    #[test]
    fn test_numeric_values_empty_range() {
        let grid = new_grid();
        let range = RangeRef::parse("C1:C3").unwrap();
        assert!(numeric_values(&grid, &range).is_empty());
    }
}
