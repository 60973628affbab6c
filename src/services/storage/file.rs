use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::services::storage::client::{KeyValueStorage, StorageError, StorageResult};

/// File-backed storage: a single JSON object `{ "key": "value", ... }`.
///
/// - The file is re-read on every access, so two processes pointing at the same
///   path observe each other's writes (last writer wins).
/// - Writes go to a sibling temp file and are renamed into place.
/// - A write over an unreadable (corrupt) file starts from an empty map and
///   replaces it.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write inside this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&raw)?)
    }

    // For write paths. The flag is `true` when a corrupt file was discarded.
    fn load_or_reset(&self) -> StorageResult<(BTreeMap<String, String>, bool)> {
        match self.load() {
            Ok(items) => Ok((items, false)),
            Err(StorageError::Corrupt(err)) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "storage file is corrupt; overwriting it"
                );
                Ok((BTreeMap::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let body = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut items, _) = self.load_or_reset()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut items, reset) = self.load_or_reset()?;
        if items.remove(key).is_none() && !reset {
            return Ok(());
        }
        self.save(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));

        assert_eq!(storage.get_item("token").unwrap(), None);
    }

    #[test]
    fn set_creates_parent_dirs_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/storage.json");
        let storage = FileStorage::new(&path);

        storage.set_item("token", "abc").unwrap();

        assert!(path.exists());
        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn writes_are_visible_to_another_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let first = FileStorage::new(&path);
        let second = FileStorage::new(&path);

        first.set_item("token", "one").unwrap();
        assert_eq!(second.get_item("token").unwrap().as_deref(), Some("one"));

        second.remove_item("token").unwrap();
        assert_eq!(first.get_item("token").unwrap(), None);
    }

    #[test]
    fn remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));

        storage.set_item("token", "abc").unwrap();
        storage.set_item("theme", "dark").unwrap();
        storage.remove_item("token").unwrap();

        assert_eq!(storage.get_item("token").unwrap(), None);
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);

        assert!(matches!(
            storage.get_item("token"),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn set_over_corrupt_file_replaces_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);

        storage.set_item("token", "abc").unwrap();

        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn remove_over_corrupt_file_leaves_it_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);

        storage.remove_item("token").unwrap();

        assert_eq!(storage.get_item("token").unwrap(), None);
    }
}
