//! Tag store - the persisted mapping from tag name to tag

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::application::errors::{StorageError, TagError};
use crate::domain::entities::tag::is_valid_name;
use crate::domain::entities::{Tag, TagSettings};
use crate::domain::traits::SettingsStore;

/// In-memory view of the settings record, written through to the backend on
/// every mutation. A failed write leaves the in-memory state untouched.
pub struct TagStore {
    state: RwLock<TagSettings>,
    backend: Arc<dyn SettingsStore>,
}

impl TagStore {
    /// Load the persisted record from `backend`.
    pub fn open(backend: Arc<dyn SettingsStore>) -> Result<Self, StorageError> {
        let settings = backend.load()?;
        tracing::info!("Loaded {} tag(s) from settings store", settings.tags.len());
        Ok(Self {
            state: RwLock::new(settings),
            backend,
        })
    }

    pub fn get(&self, name: &str) -> Option<Tag> {
        self.state.read().ok()?.tags.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state
            .read()
            .map(|s| s.tags.contains_key(name))
            .unwrap_or(false)
    }

    /// Snapshot of every tag, sorted by name.
    pub fn list(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .state
            .read()
            .map(|s| s.tags.values().cloned().collect())
            .unwrap_or_default();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    pub fn names(&self) -> Vec<String> {
        self.list().into_iter().map(|t| t.name).collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.tags.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_on_send(&self) -> bool {
        self.state.read().map(|s| s.notify_on_send).unwrap_or(true)
    }

    pub fn set_notify_on_send(&self, enabled: bool) -> Result<(), TagError> {
        self.commit(|settings| {
            settings.notify_on_send = enabled;
            Ok(())
        })
    }

    /// Insert a new tag; fails if the name is taken.
    pub fn create(&self, tag: Tag) -> Result<(), TagError> {
        validate_name(&tag.name)?;
        self.commit(|settings| {
            if settings.tags.contains_key(&tag.name) {
                return Err(TagError::AlreadyExists(tag.name.clone()));
            }
            tracing::debug!("Creating tag '{}'", tag.name);
            settings.tags.insert(tag.name.clone(), tag);
            Ok(())
        })
    }

    /// Replace the tag stored under `old_name` with `new_tag`, renaming it
    /// when the names differ. Renaming onto another existing tag is refused.
    pub fn update(&self, new_tag: Tag, old_name: &str) -> Result<(), TagError> {
        validate_name(&new_tag.name)?;
        self.commit(|settings| {
            let renamed = new_tag.name != old_name;
            if renamed && settings.tags.contains_key(&new_tag.name) {
                return Err(TagError::AlreadyExists(new_tag.name.clone()));
            }
            if settings.tags.remove(old_name).is_none() {
                tracing::warn!("Tag '{}' vanished before its edit was saved, recreating it", old_name);
            }
            if renamed {
                tracing::debug!("Renaming tag '{}' to '{}'", old_name, new_tag.name);
            }
            settings.tags.insert(new_tag.name.clone(), new_tag);
            Ok(())
        })
    }

    /// Remove a tag, returning it.
    pub fn delete(&self, name: &str) -> Result<Tag, TagError> {
        self.commit(|settings| {
            let removed = settings
                .tags
                .remove(name)
                .ok_or_else(|| TagError::NotFound(name.to_string()))?;
            tracing::debug!("Deleting tag '{}'", name);
            Ok(removed)
        })
    }

    /// Create or overwrite every entry, last write wins. Persisted as one write.
    pub fn bulk_merge(&self, entries: HashMap<String, String>) -> Result<usize, TagError> {
        for name in entries.keys() {
            validate_name(name)?;
        }
        self.commit(|settings| {
            let count = entries.len();
            for (name, message) in entries {
                settings.tags.insert(name.clone(), Tag::new(name, message));
            }
            Ok(count)
        })
    }

    /// Remove every listed tag in one write. Absent names are ignored.
    pub fn remove_many(&self, names: &[String]) -> Result<Vec<Tag>, TagError> {
        self.commit(|settings| {
            let removed: Vec<Tag> = names.iter().filter_map(|name| settings.tags.remove(name)).collect();
            for tag in &removed {
                tracing::warn!("Dropping tag '{}' (message: {:?})", tag.name, tag.message);
            }
            Ok(removed)
        })
    }

    /// Apply `mutate` to a copy of the settings, persist it, then swap it in.
    fn commit<T>(&self, mutate: impl FnOnce(&mut TagSettings) -> Result<T, TagError>) -> Result<T, TagError> {
        let mut state = self.state.write().map_err(|_| StorageError::LockPoisoned)?;
        let mut next = state.clone();
        let result = mutate(&mut next)?;
        self.backend.save(&next)?;
        *state = next;
        Ok(result)
    }
}

fn validate_name(name: &str) -> Result<(), TagError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(TagError::InvalidName(name.to_string()))
    }
}
