//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Settings persistence (JSON file, SQLite, memory)
//! - Host: In-process command namespace
//! - Adapters: Console front-end and in-memory messenger
//! - Clipboard: Where exports are copied to

pub mod adapters;
pub mod clipboard;
pub mod config;
pub mod host;
pub mod storage;
