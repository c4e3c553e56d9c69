//! In-process key-value storage.

use super::{KeyValueStorage, StorageResult};
use std::collections::HashMap;

/// Volatile storage backed by a `HashMap`.
///
/// Used by tests and hosts that do not need durability.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStorage;
    use crate::storage::KeyValueStorage;

    #[test]
    fn set_overwrites_previous_value() {
        let mut storage = MemoryStorage::with_entry("notes", "[]");
        storage.set("notes", "[1]").unwrap();
        assert_eq!(storage.get("notes").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.get("other").unwrap(), None);
    }
}
