//! Evaluation of matched fallback shapes.

use crate::engine::{
    MAX_SNAPSHOT_COLS, MAX_SNAPSHOT_ROWS, Scalar, SheetGrid, format_number, numeric_values,
};
use crate::stats;

use super::parse::{Argument, Comparison, FunctionKind, ParsedCall, ParsedExpr, Token, parse_formula};
use super::FallbackError;

/// Evaluate a normalized formula with the fallback interpreter.
///
/// `Ok(None)` means no shape matched; the caller reports the formula as
/// unsupported. `Err` means a shape matched but its arguments or range are
/// unusable.
pub fn evaluate_fallback(
    formula: &str,
    grid: &SheetGrid,
) -> Result<Option<Scalar>, FallbackError> {
    let Some(expr) = parse_formula(formula) else {
        return Ok(None);
    };

    let value = match expr {
        ParsedExpr::Call(call) => eval_call(&call, grid)?,
        ParsedExpr::If {
            condition: (lhs, op, rhs),
            then,
            otherwise,
        } => {
            let branch = if op.apply(lhs, rhs) { then } else { otherwise };
            argument_scalar(&branch)
        }
        ParsedExpr::Concat(args) => {
            let mut out = String::new();
            for arg in &args {
                out.push_str(&argument_text(arg));
            }
            Scalar::Text(out)
        }
        ParsedExpr::Arithmetic(tokens) => {
            let Some(n) = eval_arithmetic(&tokens) else {
                return Ok(None);
            };
            Scalar::Number(n)
        }
    };
    Ok(Some(value))
}

fn argument_scalar(arg: &Argument) -> Scalar {
    match arg {
        Argument::Number(n) => Scalar::Number(*n),
        Argument::Text(s) => Scalar::Text(s.clone()),
        Argument::Criterion(c) => Scalar::Text(format!("{:?}", c)),
    }
}

fn argument_text(arg: &Argument) -> String {
    match arg {
        Argument::Number(n) => format_number(*n),
        Argument::Text(s) => s.clone(),
        Argument::Criterion(c) => format!("{:?}", c),
    }
}

fn eval_call(call: &ParsedCall, grid: &SheetGrid) -> Result<Scalar, FallbackError> {
    if !call.range.fits_within(MAX_SNAPSHOT_ROWS, MAX_SNAPSHOT_COLS) {
        return Err(FallbackError::RangeTruncated {
            range: call.range.to_string(),
            max_rows: MAX_SNAPSHOT_ROWS,
            max_cols: MAX_SNAPSHOT_COLS,
        });
    }

    let values = numeric_values(grid, &call.range);
    let n = match call.function {
        FunctionKind::Sum => range_only(call, || stats::sum(&values))?,
        FunctionKind::Average => range_only(call, || stats::mean(&values))?,
        FunctionKind::Count => range_only(call, || stats::count(&values))?,
        FunctionKind::Min => range_only(call, || stats::min(&values))?,
        FunctionKind::Max => range_only(call, || stats::max(&values))?,
        FunctionKind::Median => range_only(call, || stats::median(&values))?,
        FunctionKind::StDev => range_only(call, || stats::stdev_sample(&values))?,
        FunctionKind::Var => range_only(call, || stats::var_sample(&values))?,
        FunctionKind::Mode => range_only(call, || stats::mode(&values))?,
        FunctionKind::Skew => range_only(call, || stats::skewness(&values))?,
        FunctionKind::Kurt => range_only(call, || stats::kurtosis(&values))?,
        FunctionKind::GeoMean => range_only(call, || stats::geometric_mean(&values))?,
        FunctionKind::HarMean => range_only(call, || stats::harmonic_mean(&values))?,
        FunctionKind::Percentile => {
            let k = one_number(call)?;
            if !(0.0..=1.0).contains(&k) {
                return Err(FallbackError::InvalidArgument(format!(
                    "percentile fraction {} is outside 0..=1",
                    k
                )));
            }
            stats::percentile(&values, k)
        }
        FunctionKind::Quartile => {
            let q = one_number(call)?;
            if q.fract() != 0.0 || !(0.0..=3.0).contains(&q) {
                return Err(FallbackError::InvalidArgument(format!(
                    "quartile index {} is not one of 0, 1, 2, 3",
                    q
                )));
            }
            stats::quartile(&values, q as u8)
        }
        FunctionKind::CountIf => {
            let c = one_criterion(call)?;
            values.iter().filter(|v| c.matches(**v)).count() as f64
        }
        FunctionKind::SumIf => {
            let c = one_criterion(call)?;
            values.iter().filter(|v| c.matches(**v)).sum()
        }
        FunctionKind::AverageIf => {
            let c = one_criterion(call)?;
            let matched: Vec<f64> = values.iter().copied().filter(|v| c.matches(*v)).collect();
            stats::mean(&matched)
        }
    };
    Ok(Scalar::Number(n))
}

fn range_only(call: &ParsedCall, f: impl FnOnce() -> f64) -> Result<f64, FallbackError> {
    if call.args.is_empty() {
        Ok(f())
    } else {
        Err(FallbackError::InvalidArgument(format!(
            "{:?} takes a single range, got {} extra argument(s)",
            call.function,
            call.args.len()
        )))
    }
}

fn one_number(call: &ParsedCall) -> Result<f64, FallbackError> {
    match call.args.as_slice() {
        [Argument::Number(n)] => Ok(*n),
        other => Err(FallbackError::InvalidArgument(format!(
            "{:?} expects one numeric argument after the range, got {:?}",
            call.function, other
        ))),
    }
}

fn one_criterion(call: &ParsedCall) -> Result<Comparison, FallbackError> {
    match call.args.as_slice() {
        [Argument::Criterion(c)] => Ok(*c),
        other => Err(FallbackError::InvalidArgument(format!(
            "{:?} expects one criterion after the range, got {:?}",
            call.function, other
        ))),
    }
}

/// Recursive-descent evaluation of literal arithmetic tokens.
fn eval_arithmetic(tokens: &[Token]) -> Option<f64> {
    let mut pos = 0;
    let value = parse_expr(tokens, &mut pos)?;
    (pos == tokens.len()).then_some(value)
}

fn parse_expr(tokens: &[Token], pos: &mut usize) -> Option<f64> {
    let mut acc = parse_term(tokens, pos)?;
    while let Some(Token::Op(op @ ('+' | '-'))) = tokens.get(*pos) {
        *pos += 1;
        let rhs = parse_term(tokens, pos)?;
        acc = if *op == '+' { acc + rhs } else { acc - rhs };
    }
    Some(acc)
}

fn parse_term(tokens: &[Token], pos: &mut usize) -> Option<f64> {
    let mut acc = parse_factor(tokens, pos)?;
    while let Some(Token::Op(op @ ('*' | '/'))) = tokens.get(*pos) {
        *pos += 1;
        let rhs = parse_factor(tokens, pos)?;
        acc = if *op == '*' { acc * rhs } else { acc / rhs };
    }
    Some(acc)
}

fn parse_factor(tokens: &[Token], pos: &mut usize) -> Option<f64> {
    match tokens.get(*pos)? {
        Token::Number(n) => {
            *pos += 1;
            Some(*n)
        }
        Token::Op('-') => {
            *pos += 1;
            parse_factor(tokens, pos).map(|v| -v)
        }
        Token::LParen => {
            *pos += 1;
            let inner = parse_expr(tokens, pos)?;
            match tokens.get(*pos) {
                Some(Token::RParen) => {
                    *pos += 1;
                    Some(inner)
                }
                _ => None,
            }
        }
        _ => None,
    }
}
