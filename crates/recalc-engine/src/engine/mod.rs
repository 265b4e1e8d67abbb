//! Evaluation engine API.
//!
//! - [`Scalar`] - the cell value model
//! - [`CellRef`], [`RangeRef`] - A1-notation references
//! - [`SheetGrid`] - shared snapshot cell storage
//! - [`preprocess_formula`] - transform formulas for Rhai evaluation
//! - [`create_engine`], [`evaluate_precise`] - the precise evaluation path

mod cell_ref;
mod eval;
mod grid;
mod preprocess;
mod range;
mod value;

pub use cell_ref::CellRef;
pub use eval::{create_engine, evaluate_precise};
pub use grid::{MAX_SNAPSHOT_COLS, MAX_SNAPSHOT_ROWS, SheetGrid, new_grid, numeric_values};
pub use preprocess::preprocess_formula;
pub use range::RangeRef;
pub use value::{Scalar, format_number};

pub use rhai::{Dynamic, Engine};
