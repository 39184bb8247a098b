//! Clipboard implementations

use std::sync::Mutex;

use crate::domain::traits::Clipboard;

/// Keeps the last copied text in memory
#[derive(Default)]
pub struct MemoryClipboard {
    last: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.last.lock().ok()?.clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy_to_clipboard(&self, text: &str) {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(text.to_string());
        }
    }
}

/// System clipboard via arboard. Failures are logged and otherwise ignored.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn copy_to_clipboard(&self, text: &str) {
        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string()));
        if let Err(e) = result {
            tracing::warn!("Failed to copy to the system clipboard: {}", e);
        }
    }
}

/// Clipboard used by the console front-end
pub fn default_clipboard() -> std::sync::Arc<dyn Clipboard> {
    #[cfg(feature = "clipboard")]
    {
        std::sync::Arc::new(SystemClipboard)
    }
    #[cfg(not(feature = "clipboard"))]
    {
        std::sync::Arc::new(MemoryClipboard::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_keeps_last() {
        let clipboard = MemoryClipboard::new();
        assert!(clipboard.last().is_none());
        clipboard.copy_to_clipboard("one");
        clipboard.copy_to_clipboard("two");
        assert_eq!(clipboard.last().as_deref(), Some("two"));
    }
}
