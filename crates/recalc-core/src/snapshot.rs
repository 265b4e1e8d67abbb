//! In-memory snapshots of source files.
//!
//! One snapshot per file: re-requesting a file whose mtime changed builds a
//! fresh grid and releases the old one. Snapshots share the formula cache's
//! TTL discipline so a file nobody touches cannot pin its data forever.

use recalc_engine::engine::{CellRef, MAX_SNAPSHOT_COLS, MAX_SNAPSHOT_ROWS, SheetGrid, new_grid};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::debug;

use crate::source::CellSource;

#[derive(Debug)]
struct SnapshotEntry {
    grid: SheetGrid,
    source_mtime: SystemTime,
    created_at: Instant,
    access_count: u64,
    truncated: bool,
}

/// Snapshot store. Not synchronized; callers wrap it in a lock.
#[derive(Debug)]
pub struct SnapshotCache {
    snapshots: HashMap<PathBuf, SnapshotEntry>,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        SnapshotCache {
            snapshots: HashMap::new(),
            ttl,
        }
    }

    /// Grid for `source`, reusing the stored snapshot when it is still fresh
    /// (same mtime, within TTL) and rebuilding otherwise.
    pub fn get_or_create(
        &mut self,
        source: &dyn CellSource,
        sheet: Option<&str>,
    ) -> io::Result<SheetGrid> {
        let mtime = source.modified()?;
        let path = source.path().to_path_buf();

        if let Some(entry) = self.snapshots.get_mut(&path)
            && entry.source_mtime == mtime
            && entry.created_at.elapsed() < self.ttl
        {
            entry.access_count += 1;
            return Ok(entry.grid.clone());
        }

        // Superseded or expired: release the old grid before rebuilding.
        if let Some(old) = self.snapshots.remove(&path) {
            old.grid.clear();
        }

        let region = source.list_populated_cells(sheet, MAX_SNAPSHOT_ROWS, MAX_SNAPSHOT_COLS)?;
        let grid = new_grid();
        for (col, row, value) in region.cells {
            grid.insert(CellRef::new(col, row), value);
        }
        debug!(
            file = %path.display(),
            cells = grid.len(),
            truncated = region.truncated,
            "built snapshot"
        );

        self.snapshots.insert(
            path,
            SnapshotEntry {
                grid: grid.clone(),
                source_mtime: mtime,
                created_at: Instant::now(),
                access_count: 1,
                truncated: region.truncated,
            },
        );
        Ok(grid)
    }

    /// Whether the stored snapshot of `file` dropped data at the window edge.
    pub fn is_truncated(&self, file: &Path) -> bool {
        self.snapshots.get(file).is_some_and(|e| e.truncated)
    }

    pub fn release_file(&mut self, file: &Path) {
        if let Some(entry) = self.snapshots.remove(file) {
            entry.grid.clear();
        }
    }

    /// Drop every snapshot and clear the grids. Idempotent; outstanding grid
    /// handles stay usable but see an empty grid.
    pub fn release_all(&mut self) {
        for (_, entry) in self.snapshots.drain() {
            entry.grid.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CsvSource;
    use recalc_engine::engine::Scalar;
    use std::fs;
    use std::sync::Arc;
    use std::thread::sleep;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> CsvSource {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        CsvSource::new(path)
    }

    #[test]
    fn test_reuses_fresh_snapshot() {
        let dir = TempDir::new().unwrap();
        let source = write_csv(&dir, "a.csv", "1\n2\n3\n");
        let mut cache = SnapshotCache::new(Duration::from_secs(60));

        let first = cache.get_or_create(&source, None).unwrap();
        let second = cache.get_or_create(&source, None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_rebuilds_on_mtime_change() {
        let dir = TempDir::new().unwrap();
        let source = write_csv(&dir, "a.csv", "1\n");
        let mut cache = SnapshotCache::new(Duration::from_secs(60));

        let first = cache.get_or_create(&source, None).unwrap();
        assert_eq!(
            first.get(&CellRef::new(0, 0)).map(|v| v.value().clone()),
            Some(Scalar::Number(1.0))
        );

        sleep(Duration::from_millis(50));
        fs::write(source.path(), "42\n").unwrap();

        let second = cache.get_or_create(&source, None).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(
            second.get(&CellRef::new(0, 0)).map(|v| v.value().clone()),
            Some(Scalar::Number(42.0))
        );
        // The superseded grid was released.
        assert!(first.is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_expiry_rebuilds() {
        let dir = TempDir::new().unwrap();
        let source = write_csv(&dir, "a.csv", "1\n");
        let mut cache = SnapshotCache::new(Duration::from_millis(20));

        let first = cache.get_or_create(&source, None).unwrap();
        sleep(Duration::from_millis(40));
        let second = cache.get_or_create(&source, None).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_release_all_clears_grids() {
        let dir = TempDir::new().unwrap();
        let source = write_csv(&dir, "a.csv", "1\n2\n");
        let mut cache = SnapshotCache::new(Duration::from_secs(60));

        let grid = cache.get_or_create(&source, None).unwrap();
        assert!(!grid.is_empty());
        cache.release_all();
        cache.release_all();
        assert!(cache.is_empty());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_truncation_recorded() {
        let dir = TempDir::new().unwrap();
        let mut wide = String::new();
        for i in 0..(MAX_SNAPSHOT_COLS + 5) {
            if i > 0 {
                wide.push(',');
            }
            wide.push_str(&i.to_string());
        }
        wide.push('\n');
        let source = write_csv(&dir, "wide.csv", &wide);
        let mut cache = SnapshotCache::new(Duration::from_secs(60));

        cache.get_or_create(&source, None).unwrap();
        assert!(cache.is_truncated(source.path()));
    }
}
