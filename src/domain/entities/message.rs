use chrono::{DateTime, Utc};

/// What a line of input turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Sent as-is on the user's behalf
    Text(String),
    /// `/<name> args...`, args already split
    Command { name: String, args: Vec<String> },
    Empty,
}

/// One line of user input
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub content: Content,
    pub received_at: DateTime<Utc>,
}

impl Message {
    pub fn new(chat_id: impl Into<String>, content: Content) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            content,
            received_at: Utc::now(),
        }
    }

    pub fn from_text(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(chat_id, Content::Text(text.into()))
    }

    pub fn from_command(chat_id: impl Into<String>, name: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(chat_id, Content::Command { name: name.into(), args })
    }
}
