// SyncBridge - app/store.rs
//
// Configuration slot persistence: save, load, and clear the single cloud-sync
// configuration payload for this execution context.
//
// Design principles:
// - One fixed, versionless slot key. Every save replaces the whole payload;
//   nothing is merged.
// - Writes are atomic (temp + rename) so a partially written payload is
//   never observable.
// - The public operations are fail-silent. A missing backend, an I/O error
//   or a malformed stored value are logged and collapse to "absent"; the
//   host UI never sees an error. The user can always re-enter the payload.
// - `try_*` twins return the typed outcome for tests and diagnostics.

use crate::core::payload::ConfigPayload;
use crate::platform::config::BackendKind;
use crate::platform::fs::{self, ReadLimited};
use crate::util::constants::{
    CONFIG_STORAGE_KEY, MAX_STORED_VALUE_BYTES, SLOT_FILE_EXTENSION, SLOT_TEMP_EXTENSION,
};
use crate::util::error::StorageError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

// =============================================================================
// Backends
// =============================================================================

/// A durable key/value facility local to one execution context.
pub trait StorageBackend {
    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Raw stored value, or `None` when the key was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the stored value atomically.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding `key`.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SLOT_FILE_EXTENSION}"))
    }
}

impl StorageBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        match fs::read_limited(&path, MAX_STORED_VALUE_BYTES) {
            Ok(ReadLimited::Missing) => Ok(None),
            Ok(ReadLimited::Content(content)) => Ok(Some(content)),
            Ok(ReadLimited::TooLarge { size }) => Err(StorageError::ValueTooLarge {
                key: key.to_string(),
                size,
                max_size: MAX_STORED_VALUE_BYTES,
            }),
            Err(source) => Err(StorageError::Io {
                path,
                operation: "read",
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        fs::write_atomic(&path, SLOT_TEMP_EXTENSION, value.as_bytes()).map_err(|source| {
            StorageError::Io {
                path,
                operation: "write",
                source,
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        fs::remove_if_exists(&path)
            .map(|_| ())
            .map_err(|source| StorageError::Io {
                path,
                operation: "remove",
                source,
            })
    }
}

/// In-process backend. Clones share the same slots, modelling two
/// components of one execution context.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a raw slot value, bypassing serialisation.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.put_raw(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

// =============================================================================
// ConfigStore
// =============================================================================

/// Typed result of reading the slot.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The stored payload.
    Loaded(ConfigPayload),
    /// Nothing was ever saved (or it was cleared).
    Absent,
    /// The backend is missing, failed, or held an unreadable value.
    Failed(StorageError),
}

impl LoadOutcome {
    /// Collapse to the caller-visible result: failures look like absence.
    pub fn into_payload(self) -> Option<ConfigPayload> {
        match self {
            Self::Loaded(payload) => Some(payload),
            Self::Absent | Self::Failed(_) => None,
        }
    }
}

/// Best-effort persistence of the cloud-sync configuration payload.
pub struct ConfigStore {
    backend: Option<Box<dyn StorageBackend>>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .finish()
    }
}

impl ConfigStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Some(Box::new(backend)),
        }
    }

    /// Store for a context with no durable storage.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Build the store selected by `[storage] backend`.
    pub fn from_kind(kind: BackendKind, storage_dir: &Path) -> Self {
        match kind {
            BackendKind::File => Self::new(FileBackend::new(storage_dir)),
            BackendKind::Memory => Self::new(MemoryBackend::new()),
            BackendKind::Disabled => Self::unavailable(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Persist `payload`, replacing any earlier value. Never fails; problems
    /// are logged.
    pub fn save(&self, payload: &ConfigPayload) {
        match self.try_save(payload) {
            Ok(()) => {}
            Err(StorageError::BackendUnavailable) => {
                tracing::debug!("No storage backend; configuration not saved");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save sync configuration");
            }
        }
    }

    /// Most recently saved payload, or `None` when absent or unreadable.
    pub fn load(&self) -> Option<ConfigPayload> {
        self.try_load().into_payload()
    }

    /// Remove the slot. Never fails; problems are logged.
    pub fn clear(&self) {
        match self.try_clear() {
            Ok(()) => {}
            Err(StorageError::BackendUnavailable) => {
                tracing::debug!("No storage backend; nothing to clear");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clear sync configuration");
            }
        }
    }

    /// `save` with the error surfaced.
    pub fn try_save(&self, payload: &ConfigPayload) -> Result<(), StorageError> {
        let backend = self.backend()?;
        let json = serde_json::to_string(payload)
            .map_err(|source| StorageError::Serialization { source })?;
        backend.write(CONFIG_STORAGE_KEY, &json)?;

        tracing::info!(
            backend = backend.name(),
            entries = payload.len(),
            "Sync configuration saved"
        );
        Ok(())
    }

    /// `load` with the outcome kept typed. Failures are logged here so both
    /// `load` and direct callers leave a diagnostic.
    pub fn try_load(&self) -> LoadOutcome {
        let backend = match self.backend() {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("No storage backend; configuration absent");
                return LoadOutcome::Failed(e);
            }
        };

        let raw = match backend.read(CONFIG_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Absent,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot read sync configuration; treating as absent");
                return LoadOutcome::Failed(e);
            }
        };

        match serde_json::from_str::<ConfigPayload>(&raw) {
            Ok(payload) => {
                tracing::debug!(
                    backend = backend.name(),
                    entries = payload.len(),
                    "Sync configuration loaded"
                );
                LoadOutcome::Loaded(payload)
            }
            Err(source) => {
                let e = StorageError::Deserialization {
                    key: CONFIG_STORAGE_KEY.to_string(),
                    source,
                };
                tracing::warn!(error = %e, "Stored sync configuration is malformed; treating as absent");
                LoadOutcome::Failed(e)
            }
        }
    }

    /// `clear` with the error surfaced.
    pub fn try_clear(&self) -> Result<(), StorageError> {
        let backend = self.backend()?;
        backend.remove(CONFIG_STORAGE_KEY)?;
        tracing::info!(backend = backend.name(), "Sync configuration cleared");
        Ok(())
    }

    fn backend(&self) -> Result<&dyn StorageBackend, StorageError> {
        self.backend
            .as_deref()
            .ok_or(StorageError::BackendUnavailable)
    }
}

// =============================================================================
// Unit tests
// =============================================================================
