//! Settings storage implementations

pub mod sqlite;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::errors::StorageError;
use crate::domain::entities::TagSettings;
use crate::domain::traits::SettingsStore;
use crate::infrastructure::config::{StorageBackend, TagsConfig};

pub use sqlite::SqliteSettingsStore;

/// Open the backend selected in the config.
pub fn open_settings_store(config: &TagsConfig) -> Result<Arc<dyn SettingsStore>, StorageError> {
    let store: Arc<dyn SettingsStore> = match config.storage {
        StorageBackend::Json => Arc::new(JsonSettingsStore::new(&config.data_path, config.notify_on_send)),
        StorageBackend::Sqlite => Arc::new(SqliteSettingsStore::open(&config.data_path, config.notify_on_send)?),
    };
    Ok(store)
}

/// JSON file-based store
pub struct JsonSettingsStore {
    path: PathBuf,
    default_notify_on_send: bool,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>, default_notify_on_send: bool) -> Self {
        Self {
            path: path.into(),
            default_notify_on_send,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        let name = match self.path.file_name() {
            Some(name) => format!("{}.tmp", name.to_string_lossy()),
            None => "tags.json.tmp".to_string(),
        };
        temp.set_file_name(name);
        temp
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<TagSettings, StorageError> {
        if !self.path.exists() {
            tracing::info!("No settings at {}, starting empty", self.path.display());
            return Ok(TagSettings {
                notify_on_send: self.default_notify_on_send,
                ..TagSettings::default()
            });
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut settings: TagSettings = serde_json::from_str(&content)?;
        settings.normalize();
        Ok(settings)
    }

    fn save(&self, settings: &TagSettings) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(settings)?;
        let temp = self.temp_path();
        {
            let mut file = std::fs::File::create(&temp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&temp, &self.path)?;
        tracing::debug!("Saved {} tag(s) to {}", settings.tags.len(), self.path.display());
        Ok(())
    }
}

/// Volatile store, for tests and embedding
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<TagSettings>,
    fail_writes: AtomicBool,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: TagSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Copy of what was last saved
    pub fn snapshot(&self) -> TagSettings {
        self.settings.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Make every following `save` fail, to exercise rollback paths
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<TagSettings, StorageError> {
        Ok(self.settings.lock().map_err(|_| StorageError::LockPoisoned)?.clone())
    }

    fn save(&self, settings: &TagSettings) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "writes disabled",
            )));
        }
        *self.settings.lock().map_err(|_| StorageError::LockPoisoned)? = settings.clone();
        Ok(())
    }
}
