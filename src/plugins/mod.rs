//! Plugin system
//! 
//! A plugin owns a set of host commands for its lifetime: `start` installs
//! them and `stop` removes them again.

pub mod manager;
pub mod tags;
pub mod trait_def;

pub use manager::PluginManager;
pub use tags::{Collaborators, TagsPlugin};
pub use trait_def::Plugin;
