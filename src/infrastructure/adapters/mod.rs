//! Platform adapters

pub mod console;
pub mod memory;

pub use console::{ConsoleAdapter, ConsoleEditDialog};
pub use memory::MemoryMessenger;
