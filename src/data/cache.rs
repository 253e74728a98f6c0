use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_file;
use super::model::UserTable;
use crate::error::LoadError;

/// Identity of one version of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Canonicalised path, so `./a.csv` and `a.csv` share an entry.
    pub path: PathBuf,
    /// `None` on platforms that do not report modification times.
    pub modified: Option<SystemTime>,
}

impl CacheKey {
    /// Stat `path` and build its current key.
    pub fn for_path(path: &Path) -> Result<Self, LoadError> {
        let unreadable = |source: std::io::Error| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        let canonical = path.canonicalize().map_err(unreadable)?;
        let metadata = std::fs::metadata(&canonical).map_err(unreadable)?;
        Ok(CacheKey {
            path: canonical,
            modified: metadata.modified().ok(),
        })
    }
}

/// Loaded tables, owned by the caller and keyed by [`CacheKey`].
///
/// A source whose modification time changed misses the cache and replaces
/// the stale entry. Entries otherwise live until [`TableCache::invalidate`].
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<CacheKey, Arc<UserTable>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for the current version of `path`, loading it
    /// on a miss.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<UserTable>, LoadError> {
        let key = CacheKey::for_path(path)?;
        if let Some(table) = self.entries.get(&key) {
            log::debug!("Cache hit for {}", key.path.display());
            return Ok(Arc::clone(table));
        }

        log::debug!("Cache miss for {}", key.path.display());
        let table = Arc::new(load_file(&key.path)?);
        self.entries.retain(|k, _| k.path != key.path);
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Drop every cached version of `path`. Returns whether anything was removed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let before = self.entries.len();
        self.entries.retain(|k, _| k.path != target);
        before != self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    const HEADER: &str = "Username,Device_Type,Preferred_Game_Mode,Total_Revenue_USD,Total_Play_Sessions,Signup_Date,Last_Login";

    fn write_users(path: &Path, rows: &[&str]) {
        let mut file = File::create(path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
    }

    fn set_mtime(path: &Path, secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn second_load_is_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        write_users(&path, &["ava,Mobile,Solo,10,1,2024-01-01,2024-01-02"]);

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_modification_time_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        write_users(&path, &["ava,Mobile,Solo,10,1,2024-01-01,2024-01-02"]);
        set_mtime(&path, 1_000);

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path).unwrap();
        assert_eq!(first.len(), 1);

        write_users(
            &path,
            &[
                "ava,Mobile,Solo,10,1,2024-01-01,2024-01-02",
                "ben,PC,Co-op,20,2,2024-01-01,2024-01-02",
            ],
        );
        set_mtime(&path, 2_000);

        let second = cache.get_or_load(&path).unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(cache.len(), 1, "stale version must be evicted");
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        write_users(&path, &["ava,Mobile,Solo,10,1,2024-01-01,2024-01-02"]);

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path).unwrap();
        assert!(cache.invalidate(&path));
        assert!(cache.is_empty());
        assert!(!cache.invalidate(&path));

        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn load_errors_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "Username\nava\n").unwrap();

        let mut cache = TableCache::new();
        assert!(matches!(
            cache.get_or_load(&path),
            Err(LoadError::MissingColumns { .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_source_is_unreadable() {
        let mut cache = TableCache::new();
        let err = cache
            .get_or_load(Path::new("/tmp/does-not-exist-dashboard/users.csv"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { .. }));
    }
}
