//! Shape-matched fallback interpreter.
//!
//! Formulas the precise path rejects are tokenized and matched against a
//! fixed set of call shapes (statistical functions over a single range,
//! criteria functions, literal IF/CONCATENATE, plain arithmetic). A formula
//! matching no shape is not an error here; the caller decides how to report
//! an unsupported formula.

mod eval;
mod parse;

pub use eval::evaluate_fallback;
pub use parse::{
    Argument, CmpOp, Comparison, FunctionKind, ParsedCall, ParsedExpr, Token, parse_formula,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FallbackError {
    /// The range extends past the snapshot window, so evaluating it would
    /// silently use partial data.
    #[error("range {range} exceeds the snapshot window of {max_rows} rows x {max_cols} columns")]
    RangeTruncated {
        range: String,
        max_rows: usize,
        max_cols: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
