//! CSV-backed cell source.

use recalc_engine::engine::Scalar;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{CellSource, SheetRegion};

/// A CSV file treated as a single-sheet workbook. Sheet names are ignored;
/// a CSV has only one sheet.
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource { path: path.into() }
    }
}

impl CellSource for CsvSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn modified(&self) -> io::Result<SystemTime> {
        fs::metadata(&self.path)?.modified()
    }

    fn list_populated_cells(
        &self,
        _sheet: Option<&str>,
        max_rows: usize,
        max_cols: usize,
    ) -> io::Result<SheetRegion> {
        let content = fs::read_to_string(&self.path)?;
        let mut region = SheetRegion::default();

        for (row, line) in content.lines().enumerate() {
            if row >= max_rows {
                if !line.is_empty() {
                    region.truncated = true;
                }
                break;
            }
            for (col, field) in split_csv_line(line).into_iter().enumerate() {
                if col >= max_cols {
                    region.truncated = true;
                    break;
                }
                let value = if field.quoted {
                    Scalar::Text(field.text)
                } else {
                    Scalar::parse(&field.text)
                };
                if !value.is_null() {
                    region.cells.push((col, row, value));
                }
            }
        }
        Ok(region)
    }
}

struct Field {
    text: String,
    quoted: bool,
}

/// Split one CSV line. Quoted fields may contain commas and doubled-quote
/// escapes; no multi-line fields.
fn split_csv_line(line: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' && current.trim().is_empty() {
            in_quotes = true;
            quoted = true;
            current.clear();
        } else if c == ',' {
            fields.push(Field {
                text: std::mem::take(&mut current),
                quoted,
            });
            quoted = false;
        } else {
            current.push(c);
        }
    }
    fields.push(Field {
        text: current,
        quoted,
    });
    fields
}
