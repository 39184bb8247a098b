use crate::domain::entities::Reply;

/// Sends ephemeral bot replies, visible only to the invoking user
pub trait Messenger: Send + Sync {
    fn send_bot_message(&self, chat_id: &str, reply: Reply);
}
