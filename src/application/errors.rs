//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command host and handler errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Command '{name}' is already registered by {owner}")]
    Conflict { name: String, owner: String },

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Tag registry errors, all recovered into a reply at the dispatcher
#[derive(Error, Debug)]
pub enum TagError {
    #[error("A tag with the name '{0}' already exists")]
    AlreadyExists(String),

    #[error("A tag with the name '{0}' does not exist")]
    NotFound(String),

    #[error("Failed to parse import data: {0}")]
    Parse(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid tag name: '{0}'")]
    InvalidName(String),

    #[error("The name '{0}' is reserved by another command")]
    Reserved(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Lock poisoned")]
    LockPoisoned,
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
