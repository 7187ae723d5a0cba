//! Persistent record of processed files.
//!
//! On disk the cache is one flat JSON object:
//!
//! ```text
//! {
//!   "__config_fingerprint__": "3f9c…",
//!   "/abs/path/app/User.php": "a1b2…",
//!   "/abs/path/app/Http/UserController.php": "c3d4…"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::CacheError;
use crate::config::CacheConfig;

/// Cache contents for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Fingerprint of the configuration the hashes were produced under.
    #[serde(rename = "__config_fingerprint__", default)]
    pub config_fingerprint: String,

    /// Absolute source path to content hash.
    #[serde(flatten)]
    pub file_hashes: BTreeMap<String, String>,
}

impl CacheRecord {
    fn key(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    /// Stored hash for a source file.
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.file_hashes.get(&Self::key(path)).map(String::as_str)
    }

    pub fn insert(&mut self, path: &Path, hash: impl Into<String>) {
        self.file_hashes.insert(Self::key(path), hash.into());
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.file_hashes.remove(&Self::key(path))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.file_hashes.contains_key(&Self::key(path))
    }

    /// All recorded source paths.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.file_hashes.keys().map(PathBuf::from).collect()
    }

    /// Number of recorded source files (the fingerprint is not counted).
    pub fn len(&self) -> usize {
        self.file_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_hashes.is_empty()
    }
}

/// Loads and saves the [`CacheRecord`].
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    enabled: bool,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(&config.file, config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record. Missing, unreadable or corrupt files yield an empty record.
    pub fn load(&self) -> CacheRecord {
        if !self.enabled {
            return CacheRecord::default();
        }

        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache file at {}", self.path.display());
                return CacheRecord::default();
            }
            Err(e) => {
                warn!(
                    "Failed to read cache {}: {}; treating every file as uncached",
                    self.path.display(),
                    e
                );
                return CacheRecord::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Failed to parse cache {}: {}; treating every file as uncached",
                    self.path.display(),
                    e
                );
                CacheRecord::default()
            }
        }
    }

    /// Writes the record as pretty JSON, creating parent directories as needed.
    pub fn save(&self, record: &CacheRecord) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, json).map_err(|e| CacheError::io(&self.path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FINGERPRINT_KEY;
    use tempfile::TempDir;

    fn record() -> CacheRecord {
        let mut record = CacheRecord {
            config_fingerprint: "fp".to_string(),
            ..Default::default()
        };
        record.insert(Path::new("/src/a.php"), "h1");
        record.insert(Path::new("/src/b.php"), "h2");
        record
    }

    #[test]
    fn test_json_shape_is_flat() {
        let value = serde_json::to_value(record()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object[CONFIG_FINGERPRINT_KEY], "fp");
        assert_eq!(object["/src/a.php"], "h1");
    }

    #[test]
    fn test_parses_externally_seeded_file() {
        let json = r#"{"/x/y.php": "abc", "__config_fingerprint__": "zzz"}"#;
        let record: CacheRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.config_fingerprint, "zzz");
        assert_eq!(record.get(Path::new("/x/y.php")), Some("abc"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_save_creates_parents_and_load_reads_back() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path().join("nested/dir/cache.json"), true);

        store.save(&record()).unwrap();
        assert_eq!(store.load(), record());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path().join("cache.json"), true);
        assert_eq!(store.load(), CacheRecord::default());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(CacheStore::new(&path, true).load(), CacheRecord::default());

        fs::write(&path, r#"{"/a.php": 42}"#).unwrap();
        assert_eq!(CacheStore::new(&path, true).load(), CacheRecord::default());
    }

    #[test]
    fn test_disabled_store_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cache.json");
        let store = CacheStore::new(&path, false);

        store.save(&record()).unwrap();
        assert!(!path.exists());

        fs::write(&path, serde_json::to_string(&record()).unwrap()).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_remove_keeps_fingerprint() {
        let mut record = record();
        assert_eq!(record.remove(Path::new("/src/a.php")), Some("h1".to_string()));
        assert!(!record.contains(Path::new("/src/a.php")));
        assert_eq!(record.config_fingerprint, "fp");
        assert_eq!(record.paths(), vec![PathBuf::from("/src/b.php")]);
    }
}
