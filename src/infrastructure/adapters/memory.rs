//! In-memory messenger, for tests and embedding

use std::sync::Mutex;

use crate::domain::entities::Reply;
use crate::domain::traits::Messenger;

/// Records every bot message as `(chat_id, reply)`
#[derive(Default)]
pub struct MemoryMessenger {
    replies: Mutex<Vec<(String, Reply)>>,
}

impl MemoryMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<(String, Reply)> {
        self.replies.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Drain the recorded replies
    pub fn take(&self) -> Vec<(String, Reply)> {
        self.replies
            .lock()
            .map(|mut r| std::mem::take(&mut *r))
            .unwrap_or_default()
    }
}

impl Messenger for MemoryMessenger {
    fn send_bot_message(&self, chat_id: &str, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push((chat_id.to_string(), reply));
        }
    }
}
