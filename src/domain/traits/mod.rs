//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod clipboard;
pub mod dialog;
pub mod host;
pub mod messenger;
pub mod store;

pub use bot::{Bot, BotInfo};
pub use clipboard::Clipboard;
pub use dialog::{EditDialog, EditSubmission, EditSubmitter};
pub use host::CommandHost;
pub use messenger::Messenger;
pub use store::SettingsStore;
