//! Console adapter for local use

use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::application::errors::BotError;
use crate::domain::entities::{Reply, Tag};
use crate::domain::traits::{Bot, BotInfo, EditDialog, EditSubmitter, Messenger};

/// Console front-end: reads lines from stdin, prints sent messages and bot replies
pub struct ConsoleAdapter {
    info: BotInfo,
    input: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: name.into(),
                username: "console".to_string(),
            },
            input: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Print `prompt` and read one line; `None` on end of input.
    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();
        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(line) => line.map(|l| l.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!("Failed to read from stdin: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console front-end");
        println!("{} ready. Type /help for commands, /quit to exit.", self.info.name);
        Ok(())
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("[YOU] {}", text);
        Ok(uuid::Uuid::new_v4().to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

impl Messenger for ConsoleAdapter {
    fn send_bot_message(&self, _chat_id: &str, reply: Reply) {
        println!("[BOT] {}", reply.render());
    }
}

/// Edit dialog driven from the console.
///
/// `open` only records the request; the console loop calls
/// [`ConsoleEditDialog::prompt_pending`] afterwards to ask for the new fields.
#[derive(Default)]
pub struct ConsoleEditDialog {
    pending: Mutex<Option<(Tag, EditSubmitter)>>,
}

impl ConsoleEditDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().map(|p| p.is_some()).unwrap_or(false)
    }

    /// Ask for the edited fields of a pending dialog and submit them.
    /// Blank input keeps the current value; `/cancel` or end of input abandons the edit.
    pub async fn prompt_pending(&self, adapter: &ConsoleAdapter) -> bool {
        let Some((tag, submitter)) = self.pending.lock().ok().and_then(|mut p| p.take()) else {
            return false;
        };

        println!(
            "Editing tag '{}' (blank keeps the current value, /cancel aborts)",
            submitter.original_name()
        );
        let Some(name) = adapter.read_line(&format!("Tag name [{}]: ", tag.name)).await else {
            return false;
        };
        if name.trim() == "/cancel" {
            println!("Edit cancelled");
            return false;
        }
        let Some(message) = adapter.read_line(&format!("Tag message [{}]: ", tag.message)).await else {
            return false;
        };
        if message.trim() == "/cancel" {
            println!("Edit cancelled");
            return false;
        }

        let name = if name.trim().is_empty() { tag.name.clone() } else { name.trim().to_string() };
        let message = if message.is_empty() { tag.message.clone() } else { message };
        submitter.submit(Tag::new(name, message))
    }
}

impl EditDialog for ConsoleEditDialog {
    fn open(&self, tag: Tag, submitter: EditSubmitter) {
        tracing::debug!("Edit dialog opened for '{}'", tag.name);
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some((tag, submitter));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_open_records_pending() {
        let dialog = ConsoleEditDialog::new();
        assert!(!dialog.has_pending());
        let (tx, _rx) = mpsc::unbounded_channel();
        dialog.open(Tag::new("a", "1"), EditSubmitter::new("a", tx));
        assert!(dialog.has_pending());
    }
}
