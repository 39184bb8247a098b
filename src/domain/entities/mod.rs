//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod message;
pub mod reply;
pub mod tag;

pub use command::{
    find_bool, find_string, Command, CommandContext, CommandHandler, CommandOption, CommandRegistry, InputType,
    OptionSpec, OptionType, OptionValue,
};
pub use message::{Content, Message};
pub use reply::{Embed, Reply};
pub use tag::{Tag, TagSettings};
