//! Rectangular range references ("A1:B5").

use super::cell_ref::CellRef;
use std::fmt;

/// A rectangular cell range. Endpoints may be given in any order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
}

impl RangeRef {
    pub fn new(start: CellRef, end: CellRef) -> RangeRef {
        RangeRef { start, end }
    }

    /// A single cell as a degenerate 1x1 range.
    pub fn single(cell: CellRef) -> RangeRef {
        RangeRef {
            start: cell.clone(),
            end: cell,
        }
    }

    /// Parse "A1:B5" (whitespace around endpoints tolerated).
    pub fn parse(text: &str) -> Option<RangeRef> {
        let (start, end) = text.split_once(':')?;
        Some(RangeRef::new(
            CellRef::parse(start.trim())?,
            CellRef::parse(end.trim())?,
        ))
    }

    pub fn min_row(&self) -> usize {
        self.start.row.min(self.end.row)
    }

    pub fn max_row(&self) -> usize {
        self.start.row.max(self.end.row)
    }

    pub fn min_col(&self) -> usize {
        self.start.col.min(self.end.col)
    }

    pub fn max_col(&self) -> usize {
        self.start.col.max(self.end.col)
    }

    pub fn cell_count(&self) -> usize {
        (self.max_row() - self.min_row() + 1) * (self.max_col() - self.min_col() + 1)
    }

    /// Whether the whole range lies inside a `max_rows` x `max_cols` window.
    pub fn fits_within(&self, max_rows: usize, max_cols: usize) -> bool {
        self.max_row() < max_rows && self.max_col() < max_cols
    }

    /// Cells in row-major order, regardless of endpoint order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> {
        let (min_row, max_row) = (self.min_row(), self.max_row());
        let (min_col, max_col) = (self.min_col(), self.max_col());
        (min_row..=max_row)
            .flat_map(move |row| (min_col..=max_col).map(move |col| CellRef::new(col, row)))
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_bounds() {
        let range = RangeRef::parse("B2:A5").unwrap();
        assert_eq!(range.min_col(), 0);
        assert_eq!(range.max_col(), 1);
        assert_eq!(range.min_row(), 1);
        assert_eq!(range.max_row(), 4);
        assert_eq!(range.cell_count(), 8);
    }

    #[test]
    fn test_parse_rejects_single_cell_text() {
        assert!(RangeRef::parse("A1").is_none());
        assert!(RangeRef::parse("A1:").is_none());
    }

    #[test]
    fn test_cells_row_major() {
        let range = RangeRef::parse("A1:B2").unwrap();
        let cells: Vec<String> = range.cells().map(|c| c.to_string()).collect();
        assert_eq!(cells, ["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_fits_within_window() {
        let range = RangeRef::parse("A1:A100").unwrap();
        assert!(range.fits_within(100, 10));
        assert!(!range.fits_within(99, 10));
    }
}
