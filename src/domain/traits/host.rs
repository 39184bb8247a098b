use crate::application::errors::CommandError;
use crate::domain::entities::Command;

/// Dynamic command namespace provided by the host application
pub trait CommandHost: Send + Sync {
    /// Install a command. Replacing a command with the same owner is allowed;
    /// replacing one that belongs to somebody else fails with `CommandError::Conflict`.
    fn register_command(&self, command: Command) -> Result<(), CommandError>;

    /// Remove a command; returns whether anything was removed
    fn unregister_command(&self, name: &str) -> bool;

    fn is_registered(&self, name: &str) -> bool;

    /// Owner marker of the command registered under `name`
    fn owner_of(&self, name: &str) -> Option<String>;
}
