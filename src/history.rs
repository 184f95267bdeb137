// Recently chosen words, most recent first
use crate::storage::{LocalStorage, StorageError};

const HISTORY_KEY: &str = "history";

pub struct HistoryStore {
    storage: LocalStorage,
    cap: usize,
}

impl HistoryStore {
    pub fn new(storage: LocalStorage, cap: usize) -> Self {
        Self { storage, cap }
    }

    /// Stored words, most recent first. Anything that is not a JSON string
    /// array reads as empty.
    pub fn load(&self) -> Vec<String> {
        self.storage
            .get_item(HISTORY_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&mut self, list: &[String]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(list)?;
        self.storage.set_item(HISTORY_KEY, raw)
    }

    pub fn add(&mut self, word: &str) -> Result<(), StorageError> {
        if word.trim().is_empty() {
            return Ok(());
        }
        let mut items = self.load();
        items.retain(|w| w != word);
        items.insert(0, word.to_string());
        items.truncate(self.cap);
        self.save(&items)
    }

    /// Entries starting with `prefix`, in stored order. Case-sensitive.
    pub fn matches(&self, prefix: &str) -> Vec<String> {
        self.load()
            .into_iter()
            .filter(|w| w.starts_with(prefix))
            .collect()
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(HISTORY_KEY)
    }
}
