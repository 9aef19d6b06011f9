use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use super::loader::{self, LoadedTable};

// ---------------------------------------------------------------------------
// Memoized dataset loading, keyed by source identity
// ---------------------------------------------------------------------------

/// Source identity: path plus a modification marker. A source whose
/// marker changed is treated as a different source and re-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    modified: Option<SystemTime>,
    len: u64,
}

impl Marker {
    fn probe(path: &Path) -> Result<Marker> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("reading metadata for {}", path.display()))?;
        Ok(Marker {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

struct CacheEntry {
    marker: Marker,
    table: LoadedTable,
}

/// Owns parsed datasets for the life of a session so repeated filter
/// changes never re-read or re-parse a source. Eviction is explicit
/// (`invalidate` / `clear`); there is no TTL. Inject an instance where
/// loading happens instead of reaching for global state.
#[derive(Default)]
pub struct DatasetCache {
    entries: BTreeMap<PathBuf, CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first use or
    /// when the file's modification marker changed.
    pub fn load(&mut self, path: &Path) -> Result<&LoadedTable> {
        let marker = Marker::probe(path)?;
        let stale = self
            .entries
            .get(path)
            .map_or(true, |entry| entry.marker != marker);

        if stale {
            log::debug!("dataset cache miss for {}", path.display());
            let table = loader::load_file(path)?;
            self.entries
                .insert(path.to_path_buf(), CacheEntry { marker, table });
        } else {
            log::debug!("dataset cache hit for {}", path.display());
        }

        self.entries
            .get(path)
            .map(|entry| &entry.table)
            .context("dataset cache entry missing after load")
    }

    /// Drop the cached table for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.entries.clear();
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

    fn temp_csv(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("edulens-{}-{name}", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn repeated_loads_reuse_the_parsed_table() {
        let path = temp_csv("cache-reuse.csv", "state,total_tch\nKerala,10\n");
        let mut cache = DatasetCache::new();

        let first_len = cache.load(&path).unwrap().dataset.len();
        let second_len = cache.load(&path).unwrap().dataset.len();
        assert_eq!(first_len, 1);
        assert_eq!(second_len, 1);
        assert_eq!(cache.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let path = temp_csv("cache-invalidate.csv", "state,total_tch\nKerala,10\n");
        let mut cache = DatasetCache::new();
        cache.load(&path).unwrap();

        std::fs::write(&path, "state,total_tch\nKerala,10\nGoa,4\n").unwrap();
        assert!(cache.invalidate(&path));
        let reloaded = cache.load(&path).unwrap();
        assert_eq!(reloaded.dataset.len(), 2);

        assert!(!cache.invalidate(Path::new("/nonexistent.csv")));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_source_is_an_error() {
        let mut cache = DatasetCache::new();
        assert!(cache.load(Path::new("/no/such/df_main.csv")).is_err());
    }
}
