//! Message tags plugin - lifecycle root of the tag registry

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use super::trait_def::Plugin;
use crate::application::errors::{BotError, TagError};
use crate::application::messaging::ReplyFormat;
use crate::application::services::{CommandSynchronizer, TagCommandService, TagService, TagStore, TAGS_COMMAND};
use crate::domain::entities::Tag;
use crate::domain::traits::{Clipboard, CommandHost, EditDialog, EditSubmission, Messenger, SettingsStore};
use crate::infrastructure::config::TagsConfig;

/// External collaborators the plugin is wired to
#[derive(Clone)]
pub struct Collaborators {
    pub host: Arc<dyn CommandHost>,
    pub messenger: Arc<dyn Messenger>,
    pub clipboard: Arc<dyn Clipboard>,
    pub dialog: Arc<dyn EditDialog>,
}

/// Owns the tag store and everything built on it.
pub struct TagsPlugin {
    service: Arc<TagService>,
    commands: Arc<TagCommandService>,
    host: Arc<dyn CommandHost>,
    edits: Mutex<mpsc::UnboundedReceiver<EditSubmission>>,
}

impl TagsPlugin {
    pub fn new(config: &TagsConfig, backend: Arc<dyn SettingsStore>, deps: Collaborators) -> Result<Self, BotError> {
        let store = Arc::new(TagStore::open(backend)?);
        let format = ReplyFormat::new(config.emote.clone());

        let sync = CommandSynchronizer::new(store.clone(), deps.host.clone(), deps.messenger.clone(), format.clone());
        let service = Arc::new(TagService::new(store, sync));

        let (tx, rx) = mpsc::unbounded_channel();
        let commands = Arc::new(
            TagCommandService::new(service.clone(), deps.messenger, deps.clipboard, deps.dialog, tx)
                .with_format(format)
                .with_preview_length(config.preview_length),
        );

        Ok(Self {
            service,
            commands,
            host: deps.host,
            edits: Mutex::new(rx),
        })
    }

    pub fn service(&self) -> &Arc<TagService> {
        &self.service
    }

    /// Apply every edit submitted so far without waiting.
    pub fn apply_pending_edits(&self) -> Vec<Result<Tag, TagError>> {
        let mut results = Vec::new();
        let Ok(mut edits) = self.edits.try_lock() else {
            return results;
        };
        while let Ok(submission) = edits.try_recv() {
            results.push(self.apply(submission));
        }
        results
    }

    /// Wait for the next submitted edit and apply it.
    pub async fn next_edit(&self) -> Option<Result<Tag, TagError>> {
        let submission = self.edits.lock().await.recv().await?;
        Some(self.apply(submission))
    }

    fn apply(&self, submission: EditSubmission) -> Result<Tag, TagError> {
        let original = submission.original_name.clone();
        let result = self.service.apply_edit(submission);
        if let Err(e) = &result {
            tracing::warn!("Edit of tag '{}' rejected: {}", original, e);
        }
        result
    }
}

impl Plugin for TagsPlugin {
    fn name(&self) -> &str {
        "MessageTags"
    }

    fn description(&self) -> &str {
        "Save messages and send them with a simple command"
    }

    fn start(&self) -> Result<(), BotError> {
        self.host.register_command(self.commands.command())?;
        let count = self.service.start();
        tracing::info!("MessageTags started with {} tag command(s)", count);
        Ok(())
    }

    fn stop(&self) {
        let count = self.service.stop();
        self.host.unregister_command(TAGS_COMMAND);
        tracing::info!("MessageTags stopped, removed {} tag command(s)", count);
    }

    fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            ("tags".to_string(), self.service.store().len().to_string()),
            (
                "notify-on-send".to_string(),
                self.service.store().notify_on_send().to_string(),
            ),
        ])
    }
}
