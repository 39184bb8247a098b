//! Command synchronizer - keeps the host's command namespace in step with the tag store
//!
//! Every stored tag has exactly one command owned by [`TAG_COMMAND_OWNER`]
//! and no such command exists for a name that isn't stored. Commands owned by
//! anyone else are never touched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::tag_store::TagStore;
use crate::application::errors::TagError;
use crate::application::messaging::ReplyFormat;
use crate::domain::entities::{Command, InputType, Reply, Tag};
use crate::domain::traits::{CommandHost, Messenger};

/// Owner marker attached to every command created for a tag
pub const TAG_COMMAND_OWNER: &str = "message-tags";

pub struct CommandSynchronizer {
    store: Arc<TagStore>,
    host: Arc<dyn CommandHost>,
    messenger: Arc<dyn Messenger>,
    format: ReplyFormat,
    /// Name -> registration token for every command this synchronizer installed
    registered: Mutex<HashMap<String, u64>>,
    next_token: AtomicU64,
}

impl CommandSynchronizer {
    pub fn new(
        store: Arc<TagStore>,
        host: Arc<dyn CommandHost>,
        messenger: Arc<dyn Messenger>,
        format: ReplyFormat,
    ) -> Self {
        Self {
            store,
            host,
            messenger,
            format,
            registered: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Register a command for every stored tag. Safe to call more than once.
    /// Returns the names that could not be registered.
    pub fn register_all(&self) -> Vec<String> {
        let mut skipped = Vec::new();
        for tag in self.store.list() {
            if let Err(e) = self.register_one(&tag) {
                tracing::warn!("No command for tag '{}': {}", tag.name, e);
                skipped.push(tag.name);
            }
        }
        tracing::info!("Registered {} tag command(s)", self.registered_names().len());
        skipped
    }

    /// Install (or reinstall) the command for `tag`.
    pub fn register_one(&self, tag: &Tag) -> Result<(), TagError> {
        self.ensure_available(&tag.name)?;

        let command = self.build_command(&tag.name);
        self.host.register_command(command)?;

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut registered) = self.registered.lock() {
            registered.insert(tag.name.clone(), token);
        }
        tracing::debug!("Registered command /{} (token {})", tag.name, token);
        Ok(())
    }

    /// Remove the command for `name`. No-op if it was never registered.
    pub fn unregister_one(&self, name: &str) -> bool {
        let tracked = self
            .registered
            .lock()
            .map(|mut r| r.remove(name).is_some())
            .unwrap_or(false);

        if !tracked && self.host.owner_of(name).as_deref() != Some(TAG_COMMAND_OWNER) {
            return false;
        }

        let removed = self.host.unregister_command(name);
        tracing::debug!("Unregistered command /{}", name);
        removed
    }

    /// Move the command from `old_name` to `new_tag.name`: unregister first, then register.
    pub fn rename(&self, old_name: &str, new_tag: &Tag) -> Result<(), TagError> {
        self.unregister_one(old_name);
        self.register_one(new_tag)
    }

    /// Remove every command this synchronizer installed.
    pub fn unregister_all(&self) -> usize {
        let names = self.registered_names();
        names.iter().filter(|name| self.unregister_one(name)).count()
    }

    /// Fails with `Reserved` when `name` belongs to a command we don't own.
    pub fn ensure_available(&self, name: &str) -> Result<(), TagError> {
        if self.host.is_registered(name) && self.host.owner_of(name).as_deref() != Some(TAG_COMMAND_OWNER) {
            return Err(TagError::Reserved(name.to_string()));
        }
        Ok(())
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.ensure_available(name).is_err()
    }

    /// Sorted names of the commands currently owned by this synchronizer.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registered
            .lock()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    fn build_command(&self, name: &str) -> Command {
        let store = self.store.clone();
        let messenger = self.messenger.clone();
        let format = self.format.clone();
        let name = name.to_string();

        Command::new(name.clone())
            .with_description(name.clone())
            .with_input_type(InputType::BuiltInText)
            .with_owner(TAG_COMMAND_OWNER)
            .with_handler(move |ctx, _options| {
                // Resolve at invocation time: the tag may have changed since registration.
                let Some(tag) = store.get(&name) else {
                    tracing::warn!("Command /{} invoked but its tag is gone", name);
                    messenger.send_bot_message(
                        &ctx.chat_id,
                        format.reply(format!(
                            "The tag **{}** does not exist anymore! Please refresh your tags to fix this.",
                            name
                        )),
                    );
                    return Ok(Some(Reply::text(format!("/{}", name))));
                };

                if store.notify_on_send() {
                    messenger.send_bot_message(
                        &ctx.chat_id,
                        format.reply(format!("The tag **{}** has been sent!", name)),
                    );
                }
                Ok(Some(Reply::text(tag.expanded())))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CommandContext, Message};
    use crate::infrastructure::adapters::MemoryMessenger;
    use crate::infrastructure::host::LocalCommandHost;
    use crate::infrastructure::storage::MemorySettingsStore;

    struct Fixture {
        store: Arc<TagStore>,
        host: Arc<LocalCommandHost>,
        messenger: Arc<MemoryMessenger>,
        sync: CommandSynchronizer,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(TagStore::open(Arc::new(MemorySettingsStore::new())).unwrap());
        let host = Arc::new(LocalCommandHost::new());
        let messenger = Arc::new(MemoryMessenger::new());
        let sync = CommandSynchronizer::new(store.clone(), host.clone(), messenger.clone(), ReplyFormat::default());
        Fixture { store, host, messenger, sync }
    }

    fn invoke(host: &LocalCommandHost, name: &str) -> Option<Reply> {
        let ctx = CommandContext::new(Message::from_command("chat", name, vec![]));
        host.execute(name, &ctx, &[]).unwrap()
    }

    #[test]
    fn test_register_all_is_idempotent() {
        let f = fixture();
        f.store.create(Tag::new("a", "1")).unwrap();
        f.store.create(Tag::new("b", "2")).unwrap();
        assert!(f.sync.register_all().is_empty());
        assert!(f.sync.register_all().is_empty());
        assert_eq!(f.host.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(f.sync.registered_names(), f.store.names());
    }

    #[test]
    fn test_handler_expands_and_notifies() {
        let f = fixture();
        let tag = Tag::new("greet", "hi\\nthere");
        f.store.create(tag.clone()).unwrap();
        f.sync.register_one(&tag).unwrap();

        let reply = invoke(&f.host, "greet").unwrap();
        assert_eq!(reply.content, "hi\nthere");
        let sent = f.messenger.replies();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.content.contains("has been sent"));
    }

    #[test]
    fn test_handler_respects_notify_setting() {
        let f = fixture();
        let tag = Tag::new("quiet", "shh");
        f.store.create(tag.clone()).unwrap();
        f.store.set_notify_on_send(false).unwrap();
        f.sync.register_one(&tag).unwrap();

        assert_eq!(invoke(&f.host, "quiet").unwrap().content, "shh");
        assert!(f.messenger.replies().is_empty());
    }

    #[test]
    fn test_handler_reads_current_message() {
        let f = fixture();
        let tag = Tag::new("greet", "old");
        f.store.create(tag.clone()).unwrap();
        f.sync.register_one(&tag).unwrap();
        f.store.update(Tag::new("greet", "new"), "greet").unwrap();

        assert_eq!(invoke(&f.host, "greet").unwrap().content, "new");
    }

    #[test]
    fn test_stale_command_degrades_gracefully() {
        let f = fixture();
        let tag = Tag::new("gone", "bye");
        f.store.create(tag.clone()).unwrap();
        f.sync.register_one(&tag).unwrap();
        // delete behind the synchronizer's back
        f.store.delete("gone").unwrap();

        let reply = invoke(&f.host, "gone").unwrap();
        assert_eq!(reply.content, "/gone");
        assert!(f.messenger.replies()[0].1.content.contains("does not exist anymore"));
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let f = fixture();
        assert!(!f.sync.unregister_one("never"));
    }

    #[test]
    fn test_foreign_commands_untouched() {
        let f = fixture();
        f.host
            .register_command(Command::new("tags").with_owner("builtin"))
            .unwrap();

        assert!(!f.sync.unregister_one("tags"));
        assert!(f.host.is_registered("tags"));

        let err = f.sync.register_one(&Tag::new("tags", "x")).unwrap_err();
        assert!(matches!(err, TagError::Reserved(_)));
        assert_eq!(f.host.owner_of("tags").as_deref(), Some("builtin"));
    }

    #[test]
    fn test_rename_moves_command() {
        let f = fixture();
        let a = Tag::new("a", "msg");
        f.store.create(a.clone()).unwrap();
        f.sync.register_one(&a).unwrap();

        let b = Tag::new("b", "msg");
        f.store.update(b.clone(), "a").unwrap();
        f.sync.rename("a", &b).unwrap();

        assert!(!f.host.is_registered("a"));
        assert!(f.host.is_registered("b"));
        assert_eq!(f.sync.registered_names(), vec!["b".to_string()]);
    }

    #[test]
    fn test_register_all_reports_foreign_names() {
        let f = fixture();
        f.host.register_command(Command::new("help").with_owner("console")).unwrap();
        f.store.create(Tag::new("help", "mine")).unwrap();
        f.store.create(Tag::new("ok", "fine")).unwrap();

        assert_eq!(f.sync.register_all(), vec!["help".to_string()]);
        assert_eq!(f.sync.registered_names(), vec!["ok".to_string()]);
        assert_eq!(f.host.owner_of("help").as_deref(), Some("console"));
    }

    #[test]
    fn test_unregister_all() {
        let f = fixture();
        f.store.create(Tag::new("a", "1")).unwrap();
        f.store.create(Tag::new("b", "2")).unwrap();
        f.sync.register_all();
        assert_eq!(f.sync.unregister_all(), 2);
        assert!(f.host.is_empty());
    }
}
