//! message-tags - save messages as tags and send them back with a command
//!
//! Layout:
//! - domain: entities and the traits the host side implements
//! - application: tag store, command synchronizer, codec and the `tags` command
//! - infrastructure: config, storage backends, command host, adapters
//! - plugins: lifecycle wiring

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;
