//! Tokenizer and shape matcher for the fallback interpreter.

use crate::engine::{CellRef, RangeRef};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Ident(String),
    Number(f64),
    Text(String),
    Op(char),
    Cmp(CmpOp),
    LParen,
    RParen,
    Comma,
    Colon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl CmpOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CmpOp::Gt => lhs > rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Eq => lhs == rhs,
        }
    }
}

/// Functions the fallback can dispatch. Dotted spreadsheet aliases
/// (`STDEV.S`, `PERCENTILE.INC`, ...) normalize to the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Sum,
    Average,
    Count,
    Min,
    Max,
    Median,
    StDev,
    Var,
    Percentile,
    Quartile,
    CountIf,
    SumIf,
    AverageIf,
    Mode,
    Skew,
    Kurt,
    GeoMean,
    HarMean,
}

impl FunctionKind {
    pub fn from_name(name: &str) -> Option<FunctionKind> {
        let upper = name.to_ascii_uppercase();
        let kind = match upper.as_str() {
            "SUM" => FunctionKind::Sum,
            "AVERAGE" | "AVG" => FunctionKind::Average,
            "COUNT" => FunctionKind::Count,
            "MIN" => FunctionKind::Min,
            "MAX" => FunctionKind::Max,
            "MEDIAN" => FunctionKind::Median,
            "STDEV" | "STDEV.S" => FunctionKind::StDev,
            "VAR" | "VAR.S" => FunctionKind::Var,
            "PERCENTILE" | "PERCENTILE.INC" => FunctionKind::Percentile,
            "QUARTILE" | "QUARTILE.INC" => FunctionKind::Quartile,
            "COUNTIF" => FunctionKind::CountIf,
            "SUMIF" => FunctionKind::SumIf,
            "AVERAGEIF" => FunctionKind::AverageIf,
            "MODE" | "MODE.SNGL" => FunctionKind::Mode,
            "SKEW" => FunctionKind::Skew,
            "KURT" => FunctionKind::Kurt,
            "GEOMEAN" => FunctionKind::GeoMean,
            "HARMEAN" => FunctionKind::HarMean,
            _ => return None,
        };
        Some(kind)
    }
}

/// A criterion like `">10"` or `"5"` (bare value means equality).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Comparison {
    pub op: CmpOp,
    pub value: f64,
}

impl Comparison {
    pub fn parse(text: &str) -> Option<Comparison> {
        let text = text.trim();
        let (op, rest) = if let Some(r) = text.strip_prefix(">=") {
            (CmpOp::Ge, r)
        } else if let Some(r) = text.strip_prefix("<=") {
            (CmpOp::Le, r)
        } else if let Some(r) = text.strip_prefix('>') {
            (CmpOp::Gt, r)
        } else if let Some(r) = text.strip_prefix('<') {
            (CmpOp::Lt, r)
        } else if let Some(r) = text.strip_prefix('=') {
            (CmpOp::Eq, r)
        } else {
            (CmpOp::Eq, text)
        };
        let value = rest.trim().parse::<f64>().ok()?;
        Some(Comparison { op, value })
    }

    pub fn matches(&self, v: f64) -> bool {
        self.op.apply(v, self.value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Number(f64),
    Text(String),
    Criterion(Comparison),
}

/// A recognized `FUNC(range, args...)` call.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedCall {
    pub function: FunctionKind,
    pub range: RangeRef,
    pub args: Vec<Argument>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedExpr {
    Call(ParsedCall),
    If {
        condition: (f64, CmpOp, f64),
        then: Argument,
        otherwise: Argument,
    },
    Concat(Vec<Argument>),
    Arithmetic(Vec<Token>),
}

/// Tokenize a formula. `None` means a character the fallback grammar has no
/// use for, which ends the matching attempt.
pub fn lex(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            ':' => {
                chars.next();
                tokens.push(Token::Colon);
            }
            '+' | '-' | '*' | '/' => {
                chars.next();
                tokens.push(Token::Op(c));
            }
            '>' | '<' | '=' => {
                chars.next();
                let op = match (c, chars.peek()) {
                    ('>', Some('=')) => {
                        chars.next();
                        CmpOp::Ge
                    }
                    ('<', Some('=')) => {
                        chars.next();
                        CmpOp::Le
                    }
                    ('>', _) => CmpOp::Gt,
                    ('<', _) => CmpOp::Lt,
                    _ => CmpOp::Eq,
                };
                tokens.push(Token::Cmp(op));
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                text.push('"');
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        Some(ch) => text.push(ch),
                        None => return None,
                    }
                }
                tokens.push(Token::Text(text));
            }
            '0'..='9' | '.' => {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(num.parse().ok()?));
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '.' || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

/// Match a normalized formula against the fallback shapes.
pub fn parse_formula(input: &str) -> Option<ParsedExpr> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return None;
    }

    if let [Token::Ident(name), Token::LParen, inner @ .., Token::RParen] = tokens.as_slice() {
        let upper = name.to_ascii_uppercase();
        if upper == "IF" {
            return match_if(inner);
        }
        if upper == "CONCATENATE" || upper == "CONCAT" {
            return match_concat(inner);
        }
        if let Some(function) = FunctionKind::from_name(name) {
            return match_call(function, inner);
        }
        return None;
    }

    // Plain arithmetic over literals: every token must be a number, an
    // operator or a parenthesis.
    if tokens.iter().all(|t| {
        matches!(
            t,
            Token::Number(_) | Token::Op(_) | Token::LParen | Token::RParen
        )
    }) {
        return Some(ParsedExpr::Arithmetic(tokens));
    }

    None
}

fn split_args(tokens: &[Token]) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate() {
        match t {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

fn literal_argument(tokens: &[Token]) -> Option<Argument> {
    match tokens {
        [Token::Number(n)] => Some(Argument::Number(*n)),
        [Token::Op('-'), Token::Number(n)] => Some(Argument::Number(-n)),
        [Token::Text(s)] => Some(Argument::Text(s.clone())),
        _ => None,
    }
}

/// Literal arguments, except that quoted strings and comparison tokens that
/// parse as criteria (`">10"`, `>= 3`) become [`Argument::Criterion`].
fn call_argument(tokens: &[Token]) -> Option<Argument> {
    match tokens {
        [Token::Text(s)] => match Comparison::parse(s) {
            Some(cmp) => Some(Argument::Criterion(cmp)),
            None => Some(Argument::Text(s.clone())),
        },
        [Token::Cmp(op), Token::Number(n)] => Some(Argument::Criterion(Comparison {
            op: *op,
            value: *n,
        })),
        other => literal_argument(other),
    }
}

fn range_argument(tokens: &[Token]) -> Option<RangeRef> {
    match tokens {
        [Token::Ident(start), Token::Colon, Token::Ident(end)] => {
            Some(RangeRef::new(CellRef::parse(start)?, CellRef::parse(end)?))
        }
        [Token::Ident(single)] => Some(RangeRef::single(CellRef::parse(single)?)),
        _ => None,
    }
}

fn match_call(function: FunctionKind, inner: &[Token]) -> Option<ParsedExpr> {
    let parts = split_args(inner);
    let range = range_argument(parts.first()?)?;
    let args = parts[1..]
        .iter()
        .map(|part| call_argument(part))
        .collect::<Option<Vec<_>>>()?;
    Some(ParsedExpr::Call(ParsedCall {
        function,
        range,
        args,
    }))
}

/// `IF(number cmp number, literal, literal)`.
fn match_if(inner: &[Token]) -> Option<ParsedExpr> {
    let parts = split_args(inner);
    let [cond, then, otherwise] = parts.as_slice() else {
        return None;
    };
    let [Token::Number(lhs), Token::Cmp(op), Token::Number(rhs)] = cond else {
        return None;
    };
    Some(ParsedExpr::If {
        condition: (*lhs, *op, *rhs),
        then: literal_argument(then)?,
        otherwise: literal_argument(otherwise)?,
    })
}

/// `CONCATENATE(literal, ...)` with at least one argument.
fn match_concat(inner: &[Token]) -> Option<ParsedExpr> {
    if inner.is_empty() {
        return None;
    }
    let args = split_args(inner)
        .iter()
        .map(|part| literal_argument(part))
        .collect::<Option<Vec<_>>>()?;
    Some(ParsedExpr::Concat(args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_call() {
        let tokens = lex(r#"COUNTIF(A1:A5, ">10")"#).unwrap();
        assert_eq!(tokens[0], Token::Ident("COUNTIF".to_string()));
        assert_eq!(tokens[1], Token::LParen);
        assert_eq!(tokens[3], Token::Colon);
        assert!(tokens.contains(&Token::Text(">10".to_string())));
    }

    #[test]
    fn test_lex_rejects_unknown_chars() {
        assert!(lex("A1 & B2").is_none());
    }

    #[test]
    fn test_parse_range_call() {
        let ParsedExpr::Call(call) = parse_formula("MEDIAN(B2:B9)").unwrap() else {
            panic!("expected call");
        };
        assert_eq!(call.function, FunctionKind::Median);
        assert_eq!(call.range, RangeRef::parse("B2:B9").unwrap());
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_parse_single_cell_range() {
        let ParsedExpr::Call(call) = parse_formula("SUM(C3)").unwrap() else {
            panic!("expected call");
        };
        assert_eq!(call.range, RangeRef::parse("C3:C3").unwrap());
    }

    #[test]
    fn test_parse_dotted_alias() {
        let ParsedExpr::Call(call) = parse_formula("percentile.inc(A1:A9, 0.75)").unwrap() else {
            panic!("expected call");
        };
        assert_eq!(call.function, FunctionKind::Percentile);
        assert_eq!(call.args, vec![Argument::Number(0.75)]);
    }

    #[test]
    fn test_parse_criterion_argument() {
        let ParsedExpr::Call(call) = parse_formula(r#"SUMIF(A1:A5, ">=10")"#).unwrap() else {
            panic!("expected call");
        };
        assert_eq!(
            call.args,
            vec![Argument::Criterion(Comparison {
                op: CmpOp::Ge,
                value: 10.0
            })]
        );
    }

    #[test]
    fn test_bare_criterion_means_equality() {
        assert_eq!(
            Comparison::parse("5"),
            Some(Comparison {
                op: CmpOp::Eq,
                value: 5.0
            })
        );
        assert_eq!(Comparison::parse(">abc"), None);
    }

    #[test]
    fn test_parse_if_shape() {
        let expr = parse_formula(r#"IF(1 > 2, "yes", "no")"#).unwrap();
        assert_eq!(
            expr,
            ParsedExpr::If {
                condition: (1.0, CmpOp::Gt, 2.0),
                then: Argument::Text("yes".to_string()),
                otherwise: Argument::Text("no".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_concat_shape() {
        let expr = parse_formula(r#"CONCATENATE("a", 1, "b")"#).unwrap();
        assert_eq!(
            expr,
            ParsedExpr::Concat(vec![
                Argument::Text("a".to_string()),
                Argument::Number(1.0),
                Argument::Text("b".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_arithmetic_shape() {
        let expr = parse_formula("(1 + 2) * 3").unwrap();
        assert!(matches!(expr, ParsedExpr::Arithmetic(_)));
    }

    #[test]
    fn test_unmatched_shapes() {
        assert!(parse_formula("VLOOKUP(A1, B1:C9, 2)").is_none());
        assert!(parse_formula("A1 + B2").is_none());
        assert!(parse_formula("").is_none());
    }
}
