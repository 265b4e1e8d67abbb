//! Cell reference parsing and formatting.
//!
//! Bidirectional conversion between A1 notation ("A1", "AA100") and
//! zero-indexed column/row coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse A1 notation (case-insensitive). Returns None for invalid input.
    pub fn parse(name: &str) -> Option<CellRef> {
        let digits_at = name.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = name.split_at(digits_at);
        if letters.is_empty()
            || !letters.bytes().all(|b| b.is_ascii_alphabetic())
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let mut col_acc = 0usize;
        for b in letters.bytes() {
            let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;
        let row = digits.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(col, row))
    }

    /// Column index to letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut letters = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            letters.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        letters
    }
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::CellRef;

    #[test]
    fn test_parse_basic() {
        assert_eq!(CellRef::parse("A1"), Some(CellRef::new(0, 0)));
        assert_eq!(CellRef::parse("B4"), Some(CellRef::new(1, 3)));
        assert_eq!(CellRef::parse("AA10"), Some(CellRef::new(26, 9)));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(CellRef::parse("b4"), CellRef::parse("B4"));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(CellRef::parse("A0").is_none());
        assert!(CellRef::parse("1A").is_none());
        assert!(CellRef::parse("A").is_none());
        assert!(CellRef::parse("A1B2").is_none());
        assert!(CellRef::parse("").is_none());
    }

    #[test]
    fn test_parse_overflow_returns_none() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(CellRef::parse(&huge).is_none());
    }

    #[test]
    fn test_display_round_trip() {
        for name in ["A1", "Z9", "AA100"] {
            assert_eq!(CellRef::parse(name).unwrap().to_string(), name);
        }
    }
}
