//! Scalar cell values and Rhai conversions.

use chrono::NaiveDate;
use rhai::Dynamic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A computed or stored cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl Scalar {
    /// Type a raw field from a source file: boolean, number, ISO date, text.
    /// Blank input becomes `Null`.
    pub fn parse(field: &str) -> Scalar {
        let field = field.trim();
        if field.is_empty() {
            return Scalar::Null;
        }
        if field.eq_ignore_ascii_case("true") {
            return Scalar::Bool(true);
        }
        if field.eq_ignore_ascii_case("false") {
            return Scalar::Bool(false);
        }
        if let Ok(n) = field.parse::<f64>() {
            return Scalar::Number(n);
        }
        if let Ok(d) = NaiveDate::parse_from_str(field, "%Y-%m-%d") {
            return Scalar::Date(d);
        }
        Scalar::Text(field.to_string())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Classification label: null, number, text, boolean or date.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "text",
            Scalar::Bool(_) => "boolean",
            Scalar::Date(_) => "date",
        }
    }

    /// Classify a Rhai evaluation result.
    pub fn from_dynamic(value: Dynamic) -> Scalar {
        if value.is_unit() {
            return Scalar::Null;
        }
        if let Ok(b) = value.as_bool() {
            return Scalar::Bool(b);
        }
        if let Ok(n) = value.as_float() {
            return Scalar::Number(n);
        }
        if let Ok(n) = value.as_int() {
            return Scalar::Number(n as f64);
        }
        match value.into_string() {
            Ok(s) => Scalar::Text(s),
            Err(_) => Scalar::Null,
        }
    }

    pub fn to_dynamic(&self) -> Dynamic {
        match self {
            Scalar::Null => Dynamic::UNIT,
            Scalar::Number(n) => Dynamic::from(*n),
            Scalar::Text(s) => Dynamic::from(s.clone()),
            Scalar::Bool(b) => Dynamic::from(*b),
            Scalar::Date(d) => Dynamic::from(d.to_string()),
        }
    }
}

/// Format a number without a trailing ".0" for whole values.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "#NAN!".to_string();
    }
    if n.is_infinite() {
        return "#INF!".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Number(n) => write!(f, "{}", format_number(*n)),
            Scalar::Text(s) => write!(f, "{}", s),
            Scalar::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Scalar::Date(d) => write!(f, "{}", d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_types_fields() {
        assert_eq!(Scalar::parse("42"), Scalar::Number(42.0));
        assert_eq!(Scalar::parse("-1.5"), Scalar::Number(-1.5));
        assert_eq!(Scalar::parse("TRUE"), Scalar::Bool(true));
        assert_eq!(Scalar::parse("false"), Scalar::Bool(false));
        assert_eq!(Scalar::parse(" hello "), Scalar::Text("hello".to_string()));
        assert_eq!(Scalar::parse(""), Scalar::Null);
        assert_eq!(
            Scalar::parse("2024-01-02"),
            Scalar::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[test]
    fn test_from_dynamic_classification() {
        assert_eq!(Scalar::from_dynamic(Dynamic::UNIT), Scalar::Null);
        assert_eq!(Scalar::from_dynamic(Dynamic::from(2.5_f64)), Scalar::Number(2.5));
        assert_eq!(Scalar::from_dynamic(Dynamic::from(3_i64)), Scalar::Number(3.0));
        assert_eq!(Scalar::from_dynamic(Dynamic::from(true)), Scalar::Bool(true));
        assert_eq!(
            Scalar::from_dynamic(Dynamic::from("x".to_string())),
            Scalar::Text("x".to_string())
        );
    }

    #[test]
    fn test_format_number_trims_whole_values() {
        assert_eq!(format_number(60.0), "60");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Scalar::Null.kind(), "null");
        assert_eq!(Scalar::Number(1.0).kind(), "number");
        assert_eq!(Scalar::Bool(false).kind(), "boolean");
    }
}
