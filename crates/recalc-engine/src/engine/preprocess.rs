//! Formula preprocessing for the precise path.
//!
//! Before a formula can be evaluated by Rhai, cell references must be
//! transformed into function calls:
//!
//! - range built-ins: `SUM(A1:B5)` -> `SUM_RANGE(0, 0, 1, 4)` (col/row)
//! - bare refs: `A1` -> `CELL(0, 0)`, `@A1` -> `VALUE(0, 0)`
//!
//! References inside string literals are left untouched. Anything the
//! rewriting cannot handle is passed through unchanged and left for Rhai to
//! reject, which routes the formula to the fallback interpreter.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;
use super::grid::{MAX_SNAPSHOT_COLS, MAX_SNAPSHOT_ROWS};
use super::range::RangeRef;

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Za-z]+)([0-9]+)\b").expect("cell ref regex must compile"))
}

fn value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([A-Za-z]+)([0-9]+)\b").expect("value ref regex must compile"))
}

/// Rewrite a normalized formula (no leading `=`) into a Rhai script.
pub fn preprocess_formula(formula: &str) -> String {
    rewrite_outside_strings(formula, |segment| {
        replace_cell_refs(&replace_range_calls(segment))
    })
}

/// Rewrite `SUM(A1:B5)` style calls into `SUM_RANGE(c1, r1, c2, r2)`.
/// A range reaching outside the snapshot window is left untouched; the
/// resulting script fails to parse and the fallback reports the truncation.
fn replace_range_calls(segment: &str) -> String {
    crate::builtins::range_fn_re()
        .replace_all(segment, |caps: &regex::Captures| {
            let Some(rhai_name) = crate::builtins::range_rhai_name(&caps[1]) else {
                return caps[0].to_string();
            };

            match (CellRef::parse(&caps[2]), CellRef::parse(&caps[3])) {
                (Some(start), Some(end)) => {
                    let range = RangeRef::new(start, end);
                    if !range.fits_within(MAX_SNAPSHOT_ROWS, MAX_SNAPSHOT_COLS) {
                        return caps[0].to_string();
                    }
                    format!(
                        "{}({}, {}, {}, {})",
                        rhai_name,
                        range.start.col,
                        range.start.row,
                        range.end.col,
                        range.end.row
                    )
                }
                _ => caps[0].to_string(),
            }
        })
        .to_string()
}

fn replace_cell_refs(segment: &str) -> String {
    let segment = value_re()
        .replace_all(segment, |caps: &regex::Captures| {
            let name = format!("{}{}", &caps[1], &caps[2]);
            match CellRef::parse(&name) {
                Some(cr) => format!("VALUE({}, {})", cr.col, cr.row),
                None => caps[0].to_string(),
            }
        })
        .to_string();

    cell_re()
        .replace_all(&segment, |caps: &regex::Captures| {
            let name = format!("{}{}", &caps[1], &caps[2]);
            match CellRef::parse(&name) {
                Some(cr) => format!("CELL({}, {})", cr.col, cr.row),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Apply `rewrite` to every segment outside double-quoted string literals.
/// A doubled quote inside a literal is the spreadsheet escape for `"`.
fn rewrite_outside_strings(input: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(input.len());
    let mut segment = String::new();
    let mut in_string = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    out.push('"');
                    chars.next();
                } else {
                    in_string = false;
                }
            }
            continue;
        }

        if c == '"' {
            out.push_str(&rewrite(&segment));
            segment.clear();
            out.push('"');
            in_string = true;
        } else {
            segment.push(c);
        }
    }

    if !segment.is_empty() {
        out.push_str(&rewrite(&segment));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_range_builtin() {
        assert_eq!(preprocess_formula("SUM(A1:A3)"), "SUM_RANGE(0, 0, 0, 2)");
        assert_eq!(
            preprocess_formula("AVERAGE(B2:B5)"),
            "AVERAGE_RANGE(1, 1, 1, 4)"
        );
    }

    #[test]
    fn test_rewrites_bare_cell_refs() {
        assert_eq!(preprocess_formula("A1 + B2 * 2"), "CELL(0, 0) + CELL(1, 1) * 2");
    }

    #[test]
    fn test_rewrites_typed_refs() {
        assert_eq!(preprocess_formula("@A1"), "VALUE(0, 0)");
    }

    #[test]
    fn test_mixed_range_and_cell() {
        assert_eq!(
            preprocess_formula("SUM(A1:A3) + B1"),
            "SUM_RANGE(0, 0, 0, 2) + CELL(1, 0)"
        );
    }

    #[test]
    fn test_leaves_string_literals_alone() {
        assert_eq!(preprocess_formula(r#""A1" + B1"#), r#""A1" + CELL(1, 0)"#);
        assert_eq!(preprocess_formula(r#""say ""A1"" now""#), r#""say ""A1"" now""#);
        assert_eq!(
            preprocess_formula(r#""SUM(A1:B2)" + A1"#),
            r#""SUM(A1:B2)" + CELL(0, 0)"#
        );
    }

    #[test]
    fn test_out_of_window_range_not_rewritten() {
        // Refs still rewrite, so Rhai rejects the script and the fallback
        // reports the truncation instead of summing a partial window.
        assert_eq!(
            preprocess_formula("SUM(A1:A1200)"),
            "SUM(CELL(0, 0):CELL(0, 1199))"
        );
    }

    #[test]
    fn test_unknown_function_passes_through() {
        // MEDIAN is not a precise-path builtin; its refs still get rewritten,
        // producing a script Rhai will reject, which routes to the fallback.
        assert_eq!(
            preprocess_formula("MEDIAN(A1:A3)"),
            "MEDIAN(CELL(0, 0):CELL(0, 2))"
        );
    }
}
