//! Tag service - store mutations paired with command synchronization
//!
//! Every mutating call holds one lock across the store write and the
//! namespace update, so concurrent invocations can't leave a command without
//! a tag or a tag without a command.

use std::sync::{Arc, Mutex, MutexGuard};

use super::command_sync::CommandSynchronizer;
use super::tag_codec::TagCodec;
use super::tag_store::TagStore;
use crate::application::errors::{StorageError, TagError};
use crate::domain::entities::Tag;
use crate::domain::traits::EditSubmission;

pub struct TagService {
    store: Arc<TagStore>,
    sync: CommandSynchronizer,
    codec: TagCodec,
    lock: Mutex<()>,
}

impl TagService {
    pub fn new(store: Arc<TagStore>, sync: CommandSynchronizer) -> Self {
        let codec = TagCodec::new(store.clone());
        Self {
            store,
            sync,
            codec,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &TagStore {
        &self.store
    }

    pub fn synchronizer(&self) -> &CommandSynchronizer {
        &self.sync
    }

    /// Register commands for every stored tag. Tags whose name can't get a
    /// command (e.g. it belongs to another command) are dropped from the store.
    /// Returns the number of registered tag commands.
    pub fn start(&self) -> usize {
        let _guard = match self.guard() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::error!("Cannot register tag commands: {}", e);
                return 0;
            }
        };

        let skipped = self.sync.register_all();
        self.drop_unregistered(&skipped);
        self.sync.registered_names().len()
    }

    /// Remove every tag command from the host.
    pub fn stop(&self) -> usize {
        match self.guard() {
            Ok(_guard) => self.sync.unregister_all(),
            Err(e) => {
                tracing::error!("Cannot unregister tag commands: {}", e);
                0
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Tag> {
        self.store.get(name)
    }

    pub fn list(&self) -> Vec<Tag> {
        self.store.list()
    }

    pub fn create(&self, tag: Tag) -> Result<(), TagError> {
        let _guard = self.guard()?;
        self.sync.ensure_available(&tag.name)?;
        self.store.create(tag.clone())?;

        if let Err(e) = self.sync.register_one(&tag) {
            tracing::warn!("Rolling back tag '{}': {}", tag.name, e);
            self.store.delete(&tag.name)?;
            return Err(e);
        }
        tracing::info!("Created tag '{}'", tag.name);
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<Tag, TagError> {
        let _guard = self.guard()?;
        let removed = self.store.delete(name)?;
        self.sync.unregister_one(name);
        tracing::info!("Deleted tag '{}'", name);
        Ok(removed)
    }

    /// Apply a submitted edit: update the store, then move or refresh the command.
    pub fn apply_edit(&self, submission: EditSubmission) -> Result<Tag, TagError> {
        let _guard = self.guard()?;
        let EditSubmission { original_name, tag } = submission;
        let renamed = tag.name != original_name;

        if renamed {
            self.sync.ensure_available(&tag.name)?;
        }
        self.store.update(tag.clone(), &original_name)?;

        if renamed {
            self.sync.rename(&original_name, &tag)?;
            tracing::info!("Renamed tag '{}' to '{}'", original_name, tag.name);
        } else {
            self.sync.register_one(&tag)?;
            tracing::info!("Edited tag '{}'", tag.name);
        }
        Ok(tag)
    }

    pub fn export_one(&self, name: &str) -> Result<String, TagError> {
        self.codec.export_one(name)
    }

    pub fn export_all(&self) -> Result<String, TagError> {
        self.codec.export_all()
    }

    /// Merge an export document and register a command for each merged tag.
    /// Returns the number of tags imported. A merged tag whose command can't
    /// be registered is dropped again.
    pub fn import_text(&self, text: &str) -> Result<usize, TagError> {
        let _guard = self.guard()?;
        let names = self.codec.import_text(text, |name| self.sync.is_reserved(name))?;

        let mut failed = Vec::new();
        for name in &names {
            let Some(tag) = self.store.get(name) else { continue };
            if let Err(e) = self.sync.register_one(&tag) {
                tracing::warn!("Imported tag '{}' has no command: {}", name, e);
                failed.push(name.clone());
            }
        }
        self.drop_unregistered(&failed);
        Ok(names.len() - failed.len())
    }

    pub fn set_notify_on_send(&self, enabled: bool) -> Result<(), TagError> {
        self.store.set_notify_on_send(enabled)
    }

    /// Remove tags that have no command so store and namespace match again.
    fn drop_unregistered(&self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        for name in names {
            self.sync.unregister_one(name);
        }
        if let Err(e) = self.store.remove_many(names) {
            tracing::error!("Failed to drop tags without a command: {}", e);
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, TagError> {
        self.lock
            .lock()
            .map_err(|_| TagError::Storage(StorageError::LockPoisoned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::CommandError;
    use crate::application::messaging::ReplyFormat;
    use crate::application::services::TAG_COMMAND_OWNER;
    use crate::domain::entities::{Command, TagSettings};
    use crate::domain::traits::CommandHost;
    use crate::infrastructure::adapters::MemoryMessenger;
    use crate::infrastructure::host::LocalCommandHost;
    use crate::infrastructure::storage::MemorySettingsStore;

    fn service() -> (Arc<LocalCommandHost>, TagService) {
        service_with(Arc::new(MemorySettingsStore::new()))
    }

    fn service_with(backend: Arc<MemorySettingsStore>) -> (Arc<LocalCommandHost>, TagService) {
        let store = Arc::new(TagStore::open(backend).unwrap());
        let host = Arc::new(LocalCommandHost::new());
        let sync = CommandSynchronizer::new(
            store.clone(),
            host.clone(),
            Arc::new(MemoryMessenger::new()),
            ReplyFormat::default(),
        );
        (host, TagService::new(store, sync))
    }

    fn assert_bijection(host: &LocalCommandHost, service: &TagService) {
        assert_eq!(host.names_owned_by(TAG_COMMAND_OWNER), service.store().names());
        assert_eq!(service.synchronizer().registered_names(), service.store().names());
    }

    #[test]
    fn test_create_and_delete_keep_bijection() {
        let (host, service) = service();
        service.create(Tag::new("a", "1")).unwrap();
        service.create(Tag::new("b", "2")).unwrap();
        assert_bijection(&host, &service);

        assert!(matches!(service.create(Tag::new("a", "dup")), Err(TagError::AlreadyExists(_))));
        assert_bijection(&host, &service);

        service.delete("a").unwrap();
        assert!(matches!(service.delete("a"), Err(TagError::NotFound(_))));
        assert!(!host.is_registered("a"));
        assert_bijection(&host, &service);
    }

    #[test]
    fn test_create_reserved_name_leaves_nothing_behind() {
        let (host, service) = service();
        host.register_command(Command::new("tags").with_owner("builtin")).unwrap();
        assert!(matches!(service.create(Tag::new("tags", "x")), Err(TagError::Reserved(_))));
        assert!(service.get("tags").is_none());
        assert_eq!(host.owner_of("tags").as_deref(), Some("builtin"));
    }

    #[test]
    fn test_edit_rename() {
        let (host, service) = service();
        service.create(Tag::new("a", "1")).unwrap();
        let edited = service
            .apply_edit(EditSubmission {
                original_name: "a".into(),
                tag: Tag::new("b", "2"),
            })
            .unwrap();
        assert_eq!(edited.name, "b");
        assert!(!host.is_registered("a"));
        assert!(host.is_registered("b"));
        assert!(service.get("a").is_none());
        assert_bijection(&host, &service);
    }

    #[test]
    fn test_edit_rename_collision_refused() {
        let (host, service) = service();
        service.create(Tag::new("a", "1")).unwrap();
        service.create(Tag::new("b", "2")).unwrap();
        let result = service.apply_edit(EditSubmission {
            original_name: "a".into(),
            tag: Tag::new("b", "clobber"),
        });
        assert!(matches!(result, Err(TagError::AlreadyExists(_))));
        assert_eq!(service.get("b").unwrap().message, "2");
        assert_bijection(&host, &service);
    }

    #[test]
    fn test_import_registers_commands() {
        let (host, service) = service();
        service.create(Tag::new("a", "old")).unwrap();
        let count = service.import_text(r#"{"a": "new", "c": "3"}"#).unwrap();
        assert_eq!(count, 2);
        assert!(host.is_registered("c"));
        assert_eq!(service.get("a").unwrap().message, "new");
        assert_bijection(&host, &service);
    }

    /// Host that refuses to install one particular name
    struct RefusingHost {
        inner: LocalCommandHost,
        refused: &'static str,
    }

    impl CommandHost for RefusingHost {
        fn register_command(&self, command: Command) -> Result<(), CommandError> {
            if command.name == self.refused {
                return Err(CommandError::ExecutionFailed(format!("/{} refused", self.refused)));
            }
            self.inner.register_command(command)
        }

        fn unregister_command(&self, name: &str) -> bool {
            self.inner.unregister_command(name)
        }

        fn is_registered(&self, name: &str) -> bool {
            self.inner.is_registered(name)
        }

        fn owner_of(&self, name: &str) -> Option<String> {
            self.inner.owner_of(name)
        }
    }

    #[test]
    fn test_import_drops_tags_whose_command_fails() {
        let backend = Arc::new(MemorySettingsStore::new());
        let store = Arc::new(TagStore::open(backend.clone()).unwrap());
        let host = Arc::new(RefusingHost {
            inner: LocalCommandHost::new(),
            refused: "blocked",
        });
        let sync = CommandSynchronizer::new(
            store.clone(),
            host.clone(),
            Arc::new(MemoryMessenger::new()),
            ReplyFormat::default(),
        );
        let service = TagService::new(store, sync);

        let count = service.import_text(r#"{"blocked": "1", "fine": "2"}"#).unwrap();
        assert_eq!(count, 1);
        assert_eq!(service.store().names(), vec!["fine".to_string()]);
        assert_eq!(host.inner.names_owned_by(TAG_COMMAND_OWNER), vec!["fine".to_string()]);
        assert!(!backend.snapshot().tags.contains_key("blocked"));
    }

    #[test]
    fn test_start_drops_tags_shadowing_other_commands() {
        let mut settings = TagSettings::default();
        settings.tags.insert("tags".into(), Tag::new("tags", "x"));
        settings.tags.insert("ok".into(), Tag::new("ok", "y"));
        let backend = Arc::new(MemorySettingsStore::with_settings(settings));
        let (host, service) = service_with(backend.clone());
        host.register_command(Command::new("tags").with_owner("message-tags/manage")).unwrap();

        assert_eq!(service.start(), 1);
        assert_bijection(&host, &service);
        assert_eq!(service.store().names(), vec!["ok".to_string()]);
        assert!(!backend.snapshot().tags.contains_key("tags"));
        assert_eq!(host.owner_of("tags").as_deref(), Some("message-tags/manage"));
    }

    #[test]
    fn test_concurrent_mutations_keep_bijection() {
        let (host, service) = service();
        let names = ["t0", "t1", "t2", "t3"];

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let service = &service;
                scope.spawn(move || {
                    for round in 0..50 {
                        let name = names[(worker + round) % names.len()];
                        let other = names[(worker + round + 1) % names.len()];
                        match (worker + round) % 4 {
                            0 => {
                                let _ = service.create(Tag::new(name, "m"));
                            }
                            1 => {
                                let _ = service.delete(name);
                            }
                            2 => {
                                let _ = service.apply_edit(EditSubmission {
                                    original_name: name.to_string(),
                                    tag: Tag::new(other, "edited"),
                                });
                            }
                            _ => {
                                let _ = service.import_text(&format!(r#"{{"{}": "imported"}}"#, name));
                            }
                        }
                    }
                });
            }
        });

        assert_bijection(&host, &service);
    }

    #[test]
    fn test_stop_then_start() {
        let (host, service) = service();
        service.create(Tag::new("a", "1")).unwrap();
        assert_eq!(service.stop(), 1);
        assert!(host.names_owned_by(TAG_COMMAND_OWNER).is_empty());
        assert_eq!(service.start(), 1);
        assert_bijection(&host, &service);
    }
}
