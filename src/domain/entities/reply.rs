use serde::{Deserialize, Serialize};

/// Rich embed attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
}

/// Payload produced by a command: plain text, embeds, or both
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub content: String,
    pub embeds: Vec<Embed>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embeds: Vec::new(),
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            content: String::new(),
            embeds: vec![embed],
        }
    }

    /// Flattened text form, for front-ends without embed support.
    pub fn render(&self) -> String {
        let mut out = self.content.clone();
        for embed in &self.embeds {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("{}\n{}", embed.title, embed.description));
        }
        out
    }
}
