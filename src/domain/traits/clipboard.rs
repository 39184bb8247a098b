/// Fire-and-forget clipboard access
pub trait Clipboard: Send + Sync {
    fn copy_to_clipboard(&self, text: &str);
}
