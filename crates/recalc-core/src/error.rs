//! Evaluation error taxonomy.

use recalc_engine::fallback::FallbackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    /// The formula is empty after trimming and stripping the leading `=`.
    #[error("empty formula")]
    EmptyFormula,

    /// Neither the precise path nor the fallback recognizes the formula.
    #[error("unsupported formula: {0}")]
    Unsupported(String),

    /// The source file cannot be read or its metadata is unavailable.
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] std::io::Error),

    /// The requested range extends past the snapshot window; evaluating it
    /// would silently drop data.
    #[error("range {range} exceeds the snapshot window of {max_rows} rows x {max_cols} columns")]
    RangeTruncated {
        range: String,
        max_rows: usize,
        max_cols: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<FallbackError> for EvalError {
    fn from(e: FallbackError) -> Self {
        match e {
            FallbackError::RangeTruncated {
                range,
                max_rows,
                max_cols,
            } => EvalError::RangeTruncated {
                range,
                max_rows,
                max_cols,
            },
            FallbackError::InvalidArgument(msg) => EvalError::InvalidArgument(msg),
        }
    }
}
