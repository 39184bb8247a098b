//! Plugin trait definitions

use std::collections::HashMap;
use crate::application::errors::BotError;

/// Core plugin trait that all plugins must implement
pub trait Plugin: Send + Sync {
    /// Unique identifier for the plugin
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Register the plugin's commands with the host
    fn start(&self) -> Result<(), BotError>;

    /// Remove everything `start` registered
    fn stop(&self) {}

    /// Optional: Get plugin metadata
    fn metadata(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
