//! Precise evaluation through the Rhai engine.

use rhai::{Dynamic, Engine, EvalAltResult};

use super::grid::SheetGrid;
use super::preprocess::preprocess_formula;
use super::value::Scalar;
use crate::builtins::register_builtins;

/// Build a Rhai engine with all spreadsheet built-ins bound to `grid`.
pub fn create_engine(grid: SheetGrid) -> Engine {
    let mut engine = Engine::new();
    register_builtins(&mut engine, grid);
    engine
}

/// Evaluate a normalized formula (no leading `=`) on the precise path.
///
/// An `Err` here means the formula does not fit the precise path (unknown
/// function, unsupported syntax, runtime failure). Callers route those to the
/// fallback interpreter.
pub fn evaluate_precise(engine: &Engine, formula: &str) -> Result<Scalar, Box<EvalAltResult>> {
    let script = preprocess_formula(formula);
    let result = engine.eval::<Dynamic>(&script)?;
    Ok(Scalar::from_dynamic(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CellRef, new_grid};

    fn sample_engine() -> Engine {
        let grid = new_grid();
        grid.insert(CellRef::new(0, 0), Scalar::Number(1.0));
        grid.insert(CellRef::new(0, 1), Scalar::Number(2.0));
        grid.insert(CellRef::new(0, 2), Scalar::Number(3.0));
        grid.insert(CellRef::new(1, 0), Scalar::Text("yes".to_string()));
        create_engine(grid)
    }

    #[test]
    fn test_sum_range_end_to_end() {
        let engine = sample_engine();
        let result = evaluate_precise(&engine, "SUM(A1:A3)").unwrap();
        assert_eq!(result, Scalar::Number(6.0));
    }

    #[test]
    fn test_cell_arithmetic() {
        let engine = sample_engine();
        let result = evaluate_precise(&engine, "A1 + A2 * 2").unwrap();
        assert_eq!(result, Scalar::Number(5.0));
    }

    #[test]
    fn test_typed_ref_yields_text() {
        let engine = sample_engine();
        let result = evaluate_precise(&engine, "@B1").unwrap();
        assert_eq!(result, Scalar::Text("yes".to_string()));
    }

    #[test]
    fn test_unknown_function_errors() {
        let engine = sample_engine();
        assert!(evaluate_precise(&engine, "MEDIAN(A1:A3)").is_err());
    }

    #[test]
    fn test_if_condition() {
        let engine = sample_engine();
        let result = evaluate_precise(&engine, "IF(A1 > 0.5, 10, 20)").unwrap();
        assert_eq!(result, Scalar::Number(10.0));
    }
}
