//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    /// When set, every write fails with this message.
    failing_writes: RwLock<Option<String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, as a full quota would.
    pub fn fail_writes(&self, message: Option<&str>) {
        if let Ok(mut slot) = self.failing_writes.write() {
            *slot = message.map(str::to_string);
        }
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, contents: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let contents = contents.to_string();
        Box::pin(async move {
            if let Some(message) = self.failing_writes.read().map_err(lock_error)?.clone() {
                return Err(StorageError::Io(message));
            }
            let mut entries = self.entries.write().map_err(lock_error)?;
            entries.insert(key, contents);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self.entries.read().map_err(lock_error)?;
            entries
                .get(&key)
                .cloned()
                .ok_or(StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self.entries.write().map_err(lock_error)?;
            entries.remove(&key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();

        block_on(storage.save("board", "{}")).unwrap();
        let loaded = block_on(storage.load("board")).unwrap();

        assert_eq!(loaded, "{}");
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();
        block_on(storage.save("board", "{}")).unwrap();

        block_on(storage.delete("board")).unwrap();
        assert!(matches!(
            block_on(storage.load("board")),
            Err(StorageError::NotFound(_))
        ));
        block_on(storage.delete("board")).unwrap();
    }

    #[test]
    fn test_failing_writes() {
        let storage = MemoryStorage::new();
        storage.fail_writes(Some("quota exceeded"));
        let result = block_on(storage.save("board", "{}"));
        assert!(matches!(result, Err(StorageError::Io(_))));

        storage.fail_writes(None);
        assert!(block_on(storage.save("board", "{}")).is_ok());
    }
}
