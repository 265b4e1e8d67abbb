//! Built-in spreadsheet functions registered into the Rhai engine.
//!
//! Conventions:
//! - Spreadsheet-facing built-in names are ALL CAPS (e.g. `SUM`, `AVERAGE`).
//! - Range built-ins rewrite to ALLCAPS Rhai function names (e.g. `SUM_RANGE`).
//! - If you add a new range built-in, update `RANGE_BUILTINS` and register its
//!   implementation in `register_builtins`.

use crate::engine::{CellRef, Scalar, SheetGrid};
use crate::stats;
use regex::Regex;
use rhai::{Dynamic, Engine};
use std::sync::OnceLock;

pub struct RangeBuiltin {
    pub sheet_name: &'static str,
    pub rhai_name: &'static str,
}

pub const RANGE_BUILTINS: &[RangeBuiltin] = &[
    RangeBuiltin {
        sheet_name: "SUM",
        rhai_name: "SUM_RANGE",
    },
    RangeBuiltin {
        sheet_name: "AVERAGE",
        rhai_name: "AVERAGE_RANGE",
    },
    RangeBuiltin {
        sheet_name: "AVG",
        rhai_name: "AVERAGE_RANGE",
    },
    RangeBuiltin {
        sheet_name: "COUNT",
        rhai_name: "COUNT_RANGE",
    },
    RangeBuiltin {
        sheet_name: "MIN",
        rhai_name: "MIN_RANGE",
    },
    RangeBuiltin {
        sheet_name: "MAX",
        rhai_name: "MAX_RANGE",
    },
];

/// Regex that matches range built-in calls like `SUM(A1:B5)`.
///
/// Captures:
/// - group 1: function name (e.g. `SUM`)
/// - group 2: start cell ref (e.g. `A1`)
/// - group 3: end cell ref (e.g. `B5`)
pub fn range_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let names = RANGE_BUILTINS
            .iter()
            .map(|b| b.sheet_name)
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(
            r"\b({})\(([A-Za-z]+[0-9]+)\s*:\s*([A-Za-z]+[0-9]+)\)",
            names
        ))
        .expect("built-in range regex must compile")
    })
}

pub fn range_rhai_name(sheet_name: &str) -> Option<&'static str> {
    RANGE_BUILTINS
        .iter()
        .find(|b| b.sheet_name == sheet_name)
        .map(|b| b.rhai_name)
}

/// Numeric cells of a (c1, r1)..(c2, r2) rectangle, row-major.
fn collect_numeric(grid: &SheetGrid, c1: i64, r1: i64, c2: i64, r2: i64) -> Vec<f64> {
    let min_row = r1.min(r2).max(0) as usize;
    let max_row = r1.max(r2).max(0) as usize;
    let min_col = c1.min(c2).max(0) as usize;
    let max_col = c1.max(c2).max(0) as usize;

    let mut values = Vec::new();
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            if let Some(cell) = grid.get(&CellRef::new(col, row))
                && let Some(n) = cell.as_number()
            {
                values.push(n);
            }
        }
    }
    values
}

/// Register all built-in functions into the Rhai engine.
pub fn register_builtins(engine: &mut Engine, grid: SheetGrid) {
    // CELL(col, row): numeric value at cell (empty -> 0, non-numeric -> NaN)
    let grid_cell = grid.clone();
    engine.register_fn("CELL", move |col: i64, row: i64| -> f64 {
        if col < 0 || row < 0 {
            return f64::NAN;
        }
        match grid_cell.get(&CellRef::new(col as usize, row as usize)) {
            Some(cell) => match cell.value() {
                Scalar::Number(n) => *n,
                Scalar::Null => 0.0,
                _ => f64::NAN,
            },
            None => 0.0,
        }
    });

    // VALUE(col, row): typed value at cell as Dynamic (empty -> "")
    let grid_value = grid.clone();
    engine.register_fn("VALUE", move |col: i64, row: i64| -> Dynamic {
        if col < 0 || row < 0 {
            return Dynamic::UNIT;
        }
        match grid_value.get(&CellRef::new(col as usize, row as usize)) {
            Some(cell) => match cell.value() {
                Scalar::Null => Dynamic::from("".to_string()),
                other => other.to_dynamic(),
            },
            None => Dynamic::from("".to_string()),
        }
    });

    // SUM_RANGE(c1, r1, c2, r2)
    let grid_sum = grid.clone();
    engine.register_fn(
        "SUM_RANGE",
        move |c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            stats::sum(&collect_numeric(&grid_sum, c1, r1, c2, r2))
        },
    );

    // AVERAGE_RANGE(c1, r1, c2, r2)
    let grid_avg = grid.clone();
    engine.register_fn(
        "AVERAGE_RANGE",
        move |c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            stats::mean(&collect_numeric(&grid_avg, c1, r1, c2, r2))
        },
    );

    // COUNT_RANGE(c1, r1, c2, r2): count numeric cells
    let grid_count = grid.clone();
    engine.register_fn(
        "COUNT_RANGE",
        move |c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            collect_numeric(&grid_count, c1, r1, c2, r2).len() as f64
        },
    );

    // MIN_RANGE(c1, r1, c2, r2)
    let grid_min = grid.clone();
    engine.register_fn(
        "MIN_RANGE",
        move |c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            stats::min(&collect_numeric(&grid_min, c1, r1, c2, r2))
        },
    );

    // MAX_RANGE(c1, r1, c2, r2)
    let grid_max = grid.clone();
    engine.register_fn(
        "MAX_RANGE",
        move |c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            stats::max(&collect_numeric(&grid_max, c1, r1, c2, r2))
        },
    );

    // IF(condition, then, else)
    engine.register_fn(
        "IF",
        |condition: bool, then_value: Dynamic, else_value: Dynamic| -> Dynamic {
            if condition { then_value } else { else_value }
        },
    );

    // POW(base, exp): exponentiation
    // Handle all type combinations since cell values can be int or float
    engine.register_fn("POW", |base: f64, exp: f64| -> f64 { base.powf(exp) });
    engine.register_fn("POW", |base: f64, exp: i64| -> f64 {
        base.powf(exp as f64)
    });
    engine.register_fn("POW", |base: i64, exp: f64| -> f64 {
        (base as f64).powf(exp)
    });
    engine.register_fn("POW", |base: i64, exp: i64| -> f64 {
        (base as f64).powf(exp as f64)
    });

    // SQRT(x): square root
    engine.register_fn("SQRT", |x: f64| -> f64 { x.sqrt() });
    engine.register_fn("SQRT", |x: i64| -> f64 { (x as f64).sqrt() });
}
