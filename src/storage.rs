// Key/value store persisted as a flat JSON object of string values
use std::{collections::BTreeMap, fs, io, path::PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to encode storage: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct LocalStorage {
    path: Option<PathBuf>,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Opens the store at `path`. A missing or garbled file starts empty.
    pub fn open(path: PathBuf) -> Self {
        let items = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "storage file is not a string map, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read storage file, starting empty");
                BTreeMap::new()
            }
        };
        Self { path: Some(path), items }
    }

    pub fn in_memory() -> Self {
        Self { path: None, items: BTreeMap::new() }
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value);
        self.flush()
    }

    pub fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else { return Ok(()) };
        let body = serde_json::to_string_pretty(&self.items)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| StorageError::Write { path: path.clone(), source })?;
        }
        fs::write(path, body).map_err(|source| StorageError::Write { path: path.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = LocalStorage::open(path.clone());
        assert_eq!(store.get_item("history"), None);
        store.set_item("history", "[\"a\"]".into()).unwrap();

        let reopened = LocalStorage::open(path);
        assert_eq!(reopened.get_item("history"), Some("[\"a\"]"));
    }

    #[test]
    fn garbled_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json at all").unwrap();

        let store = LocalStorage::open(path);
        assert_eq!(store.get_item("history"), None);
    }

    #[test]
    fn remove_item_drops_key() {
        let mut store = LocalStorage::in_memory();
        store.set_item("k", "v".into()).unwrap();
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k"), None);
        // removing a missing key is fine
        store.remove_item("k").unwrap();
    }
}
