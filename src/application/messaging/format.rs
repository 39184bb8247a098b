//! Reply formatting shared by tag commands and the `tags` dispatcher

use crate::domain::entities::Reply;

/// Embed colour used for tag listings
pub const LIST_COLOR: u32 = 0xd77f7f;

/// Prefixes bot replies with a configurable emote
#[derive(Debug, Clone, Default)]
pub struct ReplyFormat {
    emote: String,
}

impl ReplyFormat {
    pub fn new(emote: impl Into<String>) -> Self {
        Self { emote: emote.into() }
    }

    pub fn line(&self, text: impl AsRef<str>) -> String {
        if self.emote.is_empty() {
            text.as_ref().to_string()
        } else {
            format!("{} {}", self.emote, text.as_ref())
        }
    }

    pub fn reply(&self, text: impl AsRef<str>) -> Reply {
        Reply::text(self.line(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emote_prefix() {
        assert_eq!(ReplyFormat::new(":tag:").line("hi"), ":tag: hi");
        assert_eq!(ReplyFormat::default().line("hi"), "hi");
    }
}
