//! In-process configuration store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::error::StoreError;
use super::keys::ConfigKey;
use super::ConfigStore;

/// Configuration store backed by an in-memory map.
///
/// Entries are keyed `"{namespace}.{KEY}"`. Clones are not shared; wrap in
/// an `Arc` to share one store between a session and an engine.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    namespace: String,
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn qualified(&self, key: ConfigKey) -> String {
        format!("{}.{}", self.namespace, key.as_str())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn read(&self, key: ConfigKey) -> Option<String> {
        self.entries.read().get(&self.qualified(key)).cloned()
    }

    fn write(&self, key: ConfigKey, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(self.qualified(key), value.to_string());
        Ok(())
    }

    fn remove(&self, key: ConfigKey) -> Result<(), StoreError> {
        self.entries.write().remove(&self.qualified(key));
        Ok(())
    }
}
