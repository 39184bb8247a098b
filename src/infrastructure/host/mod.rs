//! Local command host - in-process command namespace

use std::sync::RwLock;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, CommandOption, CommandRegistry, Reply};
use crate::domain::traits::CommandHost;

/// Command namespace backed by a [`CommandRegistry`].
///
/// Handlers run without the registry lock held, so a handler may register
/// or unregister commands itself.
pub struct LocalCommandHost {
    registry: RwLock<CommandRegistry>,
}

impl LocalCommandHost {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(CommandRegistry::new()),
        }
    }

    /// Get a copy of a registered command
    pub fn get(&self, name: &str) -> Option<Command> {
        self.registry.read().ok()?.get(name).cloned()
    }

    /// Run the command registered under `name`
    pub fn execute(
        &self,
        name: &str,
        ctx: &CommandContext,
        options: &[CommandOption],
    ) -> Result<Option<Reply>, CommandError> {
        let command = self
            .get(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;
        command.execute(ctx, options)
    }

    /// Sorted names of every registered command
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .read()
            .map(|r| r.all().map(|c| c.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Sorted names of the commands registered by `owner`
    pub fn names_owned_by(&self, owner: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .read()
            .map(|r| {
                r.all()
                    .filter(|c| c.is_owned_by(owner))
                    .map(|c| c.name.clone())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// One line per command, for `/help`
    pub fn help(&self) -> String {
        let mut help = "Available commands:\n".to_string();
        for name in self.names() {
            if let Some(cmd) = self.get(&name) {
                help.push_str(&format!(
                    "  /{} - {}\n",
                    cmd.name,
                    cmd.description.as_deref().unwrap_or("")
                ));
            }
        }
        help
    }

    pub fn len(&self) -> usize {
        self.registry.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LocalCommandHost {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHost for LocalCommandHost {
    fn register_command(&self, command: Command) -> Result<(), CommandError> {
        let mut registry = self.registry.write().map_err(|_| CommandError::LockPoisoned)?;

        if let Some(existing) = registry.get(&command.name) {
            if existing.owner != command.owner {
                return Err(CommandError::Conflict {
                    name: command.name.clone(),
                    owner: existing.owner.clone().unwrap_or_else(|| "the host".to_string()),
                });
            }
        }

        tracing::debug!("Host registered /{}", command.name);
        registry.register(command);
        Ok(())
    }

    fn unregister_command(&self, name: &str) -> bool {
        match self.registry.write() {
            Ok(mut registry) => registry.remove(name).is_some(),
            Err(_) => false,
        }
    }

    fn is_registered(&self, name: &str) -> bool {
        self.registry
            .read()
            .map(|r| r.contains(name))
            .unwrap_or(false)
    }

    fn owner_of(&self, name: &str) -> Option<String> {
        self.registry.read().ok()?.get(name)?.owner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Message;

    #[test]
    fn test_register_conflicting_owner_fails() {
        let host = LocalCommandHost::new();
        host.register_command(Command::new("tags").with_owner("a")).unwrap();
        // same owner may replace
        host.register_command(Command::new("tags").with_owner("a")).unwrap();

        let err = host
            .register_command(Command::new("tags").with_owner("b"))
            .unwrap_err();
        assert!(matches!(err, CommandError::Conflict { .. }));
        assert_eq!(host.owner_of("tags").as_deref(), Some("a"));
    }

    #[test]
    fn test_execute_and_unregister() {
        let host = LocalCommandHost::new();
        host.register_command(Command::new("ping").with_handler(|_, _| Ok(Some(Reply::text("pong")))))
            .unwrap();
        let ctx = CommandContext::new(Message::from_command("chat", "ping", vec![]));
        assert_eq!(host.execute("ping", &ctx, &[]).unwrap(), Some(Reply::text("pong")));

        assert!(host.unregister_command("ping"));
        assert!(!host.unregister_command("ping"));
        assert!(matches!(host.execute("ping", &ctx, &[]), Err(CommandError::NotFound(_))));
    }

    #[test]
    fn test_help_lists_commands() {
        let host = LocalCommandHost::new();
        host.register_command(Command::new("b").with_description("second")).unwrap();
        host.register_command(Command::new("a").with_description("first")).unwrap();
        assert_eq!(host.help(), "Available commands:\n  /a - first\n  /b - second\n");
    }
}
