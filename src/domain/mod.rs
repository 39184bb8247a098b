//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (Tag, Command, Message, Reply)
//! - Traits: Abstractions for the collaborators around the tag registry
//!   (command host, settings store, messenger, clipboard, edit dialog, bot)

pub mod entities;
pub mod traits;
