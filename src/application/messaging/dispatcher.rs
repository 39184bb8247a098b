//! Message dispatcher - Routes parsed messages to host commands

use std::sync::Arc;

use super::parser::{bind_options, MessageParser};
use crate::application::errors::BotError;
use crate::domain::entities::{CommandContext, Content, InputType, Message, Reply};
use crate::domain::traits::Messenger;
use crate::infrastructure::host::LocalCommandHost;

/// Routes incoming text to the host's commands.
///
/// Returns the message that should be sent on the user's behalf, if any.
/// Command failures are reported through the messenger and never bubble up.
pub struct MessageDispatcher {
    parser: MessageParser,
    host: Arc<LocalCommandHost>,
    messenger: Arc<dyn Messenger>,
}

impl MessageDispatcher {
    pub fn new(prefix: impl Into<String>, host: Arc<LocalCommandHost>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            parser: MessageParser::new(prefix),
            host,
            messenger,
        }
    }

    /// Process a raw text message
    pub fn process_text(&self, chat_id: impl Into<String>, text: impl Into<String>) -> Result<Option<Reply>, BotError> {
        let message = self.parser.parse(chat_id, text);
        self.process(message)
    }

    /// Process a message through the dispatcher
    pub fn process(&self, message: Message) -> Result<Option<Reply>, BotError> {
        match &message.content {
            Content::Command { name, args } => {
                let name = name.clone();
                let args = args.clone();
                Ok(self.run_command(&name, &args, message))
            }
            // Plain text goes out unchanged
            Content::Text(text) => Ok(Some(Reply::text(text.clone()))),
            Content::Empty => Ok(None),
        }
    }

    fn run_command(&self, name: &str, args: &[String], message: Message) -> Option<Reply> {
        let ctx = CommandContext::new(message);

        let Some(command) = self.host.get(name) else {
            tracing::debug!("[{}] unknown command /{}", ctx.chat_id, name);
            self.messenger
                .send_bot_message(&ctx.chat_id, Reply::text(format!("Unknown command: /{}", name)));
            return None;
        };

        let options = match command.input_type {
            InputType::BuiltIn => match bind_options(&command.options, args) {
                Ok(options) => options,
                Err(e) => {
                    let usage = command.usage.as_deref().unwrap_or_default();
                    self.messenger
                        .send_bot_message(&ctx.chat_id, Reply::text(format!("{}\n{}", e, usage).trim_end().to_string()));
                    return None;
                }
            },
            InputType::BuiltInText => Vec::new(),
        };

        match command.execute(&ctx, &options) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("[{}] /{} failed: {}", ctx.chat_id, name, e);
                self.messenger
                    .send_bot_message(&ctx.chat_id, Reply::text(format!("Command /{} failed: {}", name, e)));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Command;
    use crate::domain::traits::CommandHost;
    use crate::infrastructure::adapters::MemoryMessenger;

    fn dispatcher() -> (Arc<LocalCommandHost>, Arc<MemoryMessenger>, MessageDispatcher) {
        let host = Arc::new(LocalCommandHost::new());
        let messenger = Arc::new(MemoryMessenger::new());
        let dispatcher = MessageDispatcher::new("/", host.clone(), messenger.clone());
        (host, messenger, dispatcher)
    }

    #[test]
    fn test_plain_text_is_sent() {
        let (_, _, d) = dispatcher();
        assert_eq!(d.process_text("chat", "hello").unwrap(), Some(Reply::text("hello")));
        assert_eq!(d.process_text("chat", "").unwrap(), None);
    }

    #[test]
    fn test_unknown_command_reports() {
        let (_, messenger, d) = dispatcher();
        assert_eq!(d.process_text("chat", "/missing").unwrap(), None);
        assert!(messenger.replies()[0].1.content.contains("Unknown command: /missing"));
    }

    #[test]
    fn test_text_command_ignores_args() {
        let (host, _, d) = dispatcher();
        host.register_command(
            Command::new("greet")
                .with_input_type(InputType::BuiltInText)
                .with_handler(|_, options| Ok(Some(Reply::text(format!("{} options", options.len()))))),
        )
        .unwrap();
        assert_eq!(d.process_text("chat", "/greet a b c").unwrap(), Some(Reply::text("0 options")));
    }

    #[test]
    fn test_handler_error_is_reported() {
        let (host, messenger, d) = dispatcher();
        host.register_command(Command::new("broken").with_input_type(InputType::BuiltInText))
            .unwrap();
        assert_eq!(d.process_text("chat", "/broken").unwrap(), None);
        assert!(messenger.replies()[0].1.content.contains("failed"));
    }
}
