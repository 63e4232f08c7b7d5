//! Debounced persistence of the session document.
//!
//! Store changes mark the session dirty; the host polls [`AutoSaveManager::maybe_save`]
//! and a write happens once the debounce window since the first unsaved
//! change has passed. Several changes inside one window produce one write.

use crate::board::BoardStore;
use crate::codec::ImportOutcome;
use crate::drawing::{DrawingPort, DrawingStore};
use crate::events::SubscriptionId;
use crate::storage::{Storage, StorageError, StorageResult};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default debounce window in milliseconds.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 250;

/// Key the session document is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "rinkboard_export_v1";

/// Manages automatic persistence of a board session.
pub struct AutoSaveManager<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    /// Key the document is written under.
    key: String,
    /// Quiet period between the first change and the write.
    debounce: Duration,
    /// Time of the first change since the last write.
    dirty_since: Rc<Cell<Option<Instant>>>,
    /// Last successful write.
    last_save: Option<Instant>,
    /// Subscriptions on the attached board and drawing stores.
    board_subscription: Option<SubscriptionId>,
    drawing_subscription: Option<SubscriptionId>,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            key: DEFAULT_STORAGE_KEY.to_string(),
            debounce: Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS),
            dirty_since: Rc::new(Cell::new(None)),
            last_save: None,
            board_subscription: None,
            drawing_subscription: None,
        }
    }

    /// Set the debounce window.
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    /// Get the debounce window.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Set the storage key.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Get the storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Time of the last successful write.
    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Mark the session as changed at `at`. Earlier unsaved changes keep
    /// their timestamp.
    pub fn mark_dirty_at(&self, at: Instant) {
        if self.dirty_since.get().is_none() {
            self.dirty_since.set(Some(at));
        }
    }

    /// Mark the session as changed now.
    pub fn mark_dirty(&self) {
        self.mark_dirty_at(Instant::now());
    }

    /// Check if the session has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty_since.get().is_some()
    }

    /// Whether the debounce window has passed for the pending changes.
    pub fn should_save(&self, now: Instant) -> bool {
        match self.dirty_since.get() {
            Some(since) => now.saturating_duration_since(since) >= self.debounce,
            None => false,
        }
    }

    /// Listen to both stores so every change marks the session dirty.
    pub fn attach(&mut self, board: &mut BoardStore<DrawingStore>) {
        self.detach(board);

        let dirty = self.dirty_since.clone();
        self.board_subscription = Some(board.subscribe(move |_| {
            if dirty.get().is_none() {
                dirty.set(Some(Instant::now()));
            }
        }));

        let dirty = self.dirty_since.clone();
        self.drawing_subscription = Some(board.drawing_mut().subscribe(move |_| {
            if dirty.get().is_none() {
                dirty.set(Some(Instant::now()));
            }
        }));
    }

    /// Stop listening to the stores.
    pub fn detach(&mut self, board: &mut BoardStore<DrawingStore>) {
        if let Some(id) = self.board_subscription.take() {
            board.unsubscribe(id);
        }
        if let Some(id) = self.drawing_subscription.take() {
            board.drawing_mut().unsubscribe(id);
        }
    }

    /// Write the session if it is dirty and the debounce window has passed.
    ///
    /// Failures are logged and swallowed; the next change schedules another
    /// attempt. Returns true if a write happened.
    pub async fn maybe_save<D: DrawingPort>(&mut self, board: &BoardStore<D>, now: Instant) -> bool {
        if !self.should_save(now) {
            return false;
        }
        match self.save_now(board).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Autosave failed: {}", e);
                self.dirty_since.set(None);
                false
            }
        }
    }

    /// Write the session immediately.
    pub async fn save_now<D: DrawingPort>(&mut self, board: &BoardStore<D>) -> StorageResult<()> {
        let document = board.export_all();
        let json = serde_json::to_string(&document)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.storage.save(&self.key, &json).await?;

        log::debug!("Autosaved session ({} bytes)", json.len());
        self.last_save = Some(Instant::now());
        self.dirty_since.set(None);
        Ok(())
    }

    /// Load the stored session into `board`.
    ///
    /// Returns `None` when nothing is stored or storage is unavailable;
    /// otherwise the outcome of the sanitizing import.
    pub async fn restore<D: DrawingPort>(&mut self, board: &mut BoardStore<D>) -> Option<ImportOutcome> {
        let text = match self.storage.load(&self.key).await {
            Ok(text) => text,
            Err(StorageError::NotFound(_)) => {
                log::info!("No saved session found");
                return None;
            }
            Err(e) => {
                log::warn!("Failed to read saved session: {}", e);
                return None;
            }
        };

        let outcome = board.import_json(&text);
        if outcome.ok {
            log::info!("Restored saved session");
        }
        // Restoring is not an edit.
        self.dirty_since.set(None);
        Some(outcome)
    }

    /// Remove the stored session. Pending changes stay pending.
    pub async fn forget(&self) -> StorageResult<()> {
        self.storage.delete(&self.key).await?;
        log::info!("Removed saved session");
        Ok(())
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

/// Type alias for the auto-save manager with platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformAutoSaveManager = AutoSaveManager<PlatformStorage>;

/// Convenience function to create an auto-save manager with default storage.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_autosave_manager() -> StorageResult<PlatformAutoSaveManager> {
    let storage = create_default_storage()?;
    Ok(AutoSaveManager::new(storage))
}
