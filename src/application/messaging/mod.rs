//! Message handling - parsing console input and routing it to host commands

pub mod dispatcher;
pub mod format;
pub mod parser;

pub use dispatcher::MessageDispatcher;
pub use format::ReplyFormat;
pub use parser::{bind_options, MessageParser};
