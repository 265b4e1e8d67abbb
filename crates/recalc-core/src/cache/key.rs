use std::path::PathBuf;

/// Identity of a cached result: which file, which formula, which sheet.
///
/// The formula is stored normalized (trimmed, leading `=` stripped) so that
/// `=SUM(A1:A3)` and `SUM(A1:A3)` share an entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub file: PathBuf,
    pub formula: String,
    pub sheet: Option<String>,
}

impl CacheKey {
    pub fn new(file: impl Into<PathBuf>, formula: impl Into<String>, sheet: Option<&str>) -> Self {
        CacheKey {
            file: file.into(),
            formula: formula.into(),
            sheet: sheet.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_keys_distinguish_sheets() {
        let a = CacheKey::new("/tmp/x.csv", "SUM(A1:A3)", None);
        let b = CacheKey::new("/tmp/x.csv", "SUM(A1:A3)", Some("Q2"));
        assert_ne!(a, b);

        let mut map = HashMap::new();
        map.insert(a.clone(), 1);
        map.insert(b, 2);
        assert_eq!(map[&a], 1);
        assert_eq!(map.len(), 2);
    }
}
