use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Names are invoked as `/<name>`, so they can't carry whitespace or a leading slash.
static TAG_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s/][^\s]*$").expect("valid tag name pattern"));

/// Escape sequence stored in messages and expanded at send time
pub const NEWLINE_ESCAPE: &str = "\\n";

/// A named message snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub message: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The message as it should be sent: every literal `\n` becomes a newline.
    pub fn expanded(&self) -> String {
        expand_escapes(&self.message)
    }

    /// Short single-line preview used by listings.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.message.chars().take(max_chars).collect();
        preview = preview.replace(NEWLINE_ESCAPE, " ");
        if self.message.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}

pub fn expand_escapes(message: &str) -> String {
    message.replace(NEWLINE_ESCAPE, "\n")
}

pub fn is_valid_name(name: &str) -> bool {
    TAG_NAME.is_match(name)
}

/// Settings record persisted by the settings store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSettings {
    #[serde(default = "default_notify_on_send")]
    pub notify_on_send: bool,
    #[serde(default)]
    pub tags: HashMap<String, Tag>,
}

impl TagSettings {
    /// Make every tag's name agree with the key it is stored under.
    pub fn normalize(&mut self) {
        for (key, tag) in self.tags.iter_mut() {
            if &tag.name != key {
                tracing::warn!("Stored tag '{}' is keyed as '{}', using the key", tag.name, key);
                tag.name = key.clone();
            }
        }
    }
}

fn default_notify_on_send() -> bool {
    true
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            notify_on_send: default_notify_on_send(),
            tags: HashMap::new(),
        }
    }
}
