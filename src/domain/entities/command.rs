use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{Message, Reply};
use crate::application::errors::CommandError;

/// How the host offers a command to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Built-in command with a typed option schema
    BuiltIn,
    /// Built-in command whose output is sent as the user's message
    BuiltInText,
}

/// Option value types understood by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    SubCommand,
    String,
    Boolean,
}

/// Declared option in a command's argument schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub option_type: OptionType,
    pub required: bool,
    pub options: Vec<OptionSpec>,
}

impl OptionSpec {
    pub fn sub_command(name: impl Into<String>, description: impl Into<String>, options: Vec<OptionSpec>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            option_type: OptionType::SubCommand,
            required: false,
            options,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            option_type: OptionType::String,
            required,
            options: Vec::new(),
        }
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            option_type: OptionType::Boolean,
            required,
            options: Vec::new(),
        }
    }
}

/// Bound option value passed to a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Boolean(bool),
    SubCommand(Vec<CommandOption>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub value: OptionValue,
}

impl CommandOption {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::String(value.into()),
        }
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::Boolean(value),
        }
    }

    pub fn sub_command(name: impl Into<String>, options: Vec<CommandOption>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::SubCommand(options),
        }
    }
}

pub fn find_string<'a>(options: &'a [CommandOption], name: &str) -> Option<&'a str> {
    options.iter().find(|o| o.name == name).and_then(|o| match &o.value {
        OptionValue::String(s) => Some(s.as_str()),
        _ => None,
    })
}

pub fn find_bool(options: &[CommandOption], name: &str) -> Option<bool> {
    options.iter().find(|o| o.name == name).and_then(|o| match o.value {
        OptionValue::Boolean(b) => Some(b),
        _ => None,
    })
}

/// Invocation context handed to every handler
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub chat_id: String,
    pub message: Message,
}

impl CommandContext {
    pub fn new(message: Message) -> Self {
        Self {
            chat_id: message.chat_id.clone(),
            message,
        }
    }
}

/// Command handler function type
pub type CommandHandler =
    Arc<dyn Fn(&CommandContext, &[CommandOption]) -> Result<Option<Reply>, CommandError> + Send + Sync>;

/// Represents a command in the host namespace
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub input_type: InputType,
    pub options: Vec<OptionSpec>,
    /// Subsystem that registered the command; others must leave it alone
    pub owner: Option<String>,
    pub handler: Option<CommandHandler>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            usage: None,
            input_type: InputType::BuiltIn,
            options: Vec::new(),
            owner: None,
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandContext, &[CommandOption]) -> Result<Option<Reply>, CommandError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner.as_deref() == Some(owner)
    }

    pub fn execute(&self, ctx: &CommandContext, options: &[CommandOption]) -> Result<Option<Reply>, CommandError> {
        match &self.handler {
            Some(handler) => handler(ctx, options),
            None => Err(CommandError::ExecutionFailed(format!("Command {} not implemented", self.name))),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_type", &self.input_type)
            .field("owner", &self.owner)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// Command registry for managing available commands
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a command, returning the one it replaced.
    pub fn register(&mut self, command: Command) -> Option<Command> {
        self.commands.insert(command.name.clone(), command)
    }

    pub fn remove(&mut self, name: &str) -> Option<Command> {
        self.commands.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
