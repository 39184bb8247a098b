use crate::application::errors::StorageError;
use crate::domain::entities::TagSettings;

/// Durable storage for the settings record that holds the tags.
///
/// `save` must not return until the record is durable.
pub trait SettingsStore: Send + Sync {
    /// Load the persisted record, or the defaults when nothing was saved yet
    fn load(&self) -> Result<TagSettings, StorageError>;

    /// Replace the persisted record
    fn save(&self, settings: &TagSettings) -> Result<(), StorageError>;
}
