//! Cell sources: where snapshot data comes from.

mod csv;

pub use csv::CsvSource;

use recalc_engine::engine::Scalar;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Populated cells of one sheet, restricted to the snapshot window.
#[derive(Debug, Default)]
pub struct SheetRegion {
    /// (col, row, value) triples, rows in file order.
    pub cells: Vec<(usize, usize, Scalar)>,
    /// True when the file holds data beyond the requested window.
    pub truncated: bool,
}

/// A file that can be snapshotted into a grid.
///
/// Implementations read eagerly: `list_populated_cells` returns a complete
/// region so the snapshot layer never holds a file handle open.
pub trait CellSource {
    fn path(&self) -> &Path;

    fn modified(&self) -> io::Result<SystemTime>;

    /// Populated cells of the named sheet (or the default sheet) within a
    /// `max_rows` x `max_cols` window.
    fn list_populated_cells(
        &self,
        sheet: Option<&str>,
        max_rows: usize,
        max_cols: usize,
    ) -> io::Result<SheetRegion>;
}
