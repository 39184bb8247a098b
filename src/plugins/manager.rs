//! Plugin manager - handles plugin lifecycle

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::application::errors::BotError;
use crate::plugins::trait_def::Plugin;

/// Manages all plugins for the bot
#[derive(Default)]
pub struct PluginManager {
    plugins: HashMap<String, Arc<dyn Plugin>>,
    started: Vec<String>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), String> {
        let name = plugin.name().to_string();

        if self.plugins.contains_key(&name) {
            return Err(format!("Plugin '{}' already registered", name));
        }

        info!("Registering plugin: {}", name);
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Start every registered plugin. Stops at the first failure.
    pub fn start_all(&mut self) -> Result<(), BotError> {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();

        for name in names {
            if self.started.contains(&name) {
                continue;
            }
            if let Some(plugin) = self.plugins.get(&name) {
                if let Err(e) = plugin.start() {
                    error!("Plugin '{}' failed to start: {}", name, e);
                    return Err(e);
                }
                info!("Started plugin: {}", name);
                self.started.push(name);
            }
        }
        Ok(())
    }

    /// Stop started plugins in reverse start order
    pub fn stop_all(&mut self) {
        while let Some(name) = self.started.pop() {
            if let Some(plugin) = self.plugins.get(&name) {
                plugin.stop();
                info!("Stopped plugin: {}", name);
            }
        }
    }

    /// List all registered plugins
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        let mut list: Vec<PluginInfo> = self
            .plugins
            .iter()
            .map(|(name, plugin)| PluginInfo {
                name: name.clone(),
                description: plugin.description().to_string(),
                metadata: plugin.metadata(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Check if a plugin exists
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn is_started(&self, name: &str) -> bool {
        self.started.iter().any(|n| n == name)
    }
}

/// Plugin information for listing
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}
