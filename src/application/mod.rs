//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: tag store, command synchronizer, codec and the `tags` command
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing, option binding, dispatching, reply formatting

pub mod errors;
pub mod services;
pub mod messaging;
