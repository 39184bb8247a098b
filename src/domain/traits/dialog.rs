use tokio::sync::mpsc;
use crate::domain::entities::Tag;

/// Result of a submitted edit dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSubmission {
    /// Name the tag had when the dialog was opened
    pub original_name: String,
    pub tag: Tag,
}

/// Handle given to an open dialog so it can report back once the user saves.
#[derive(Debug, Clone)]
pub struct EditSubmitter {
    original_name: String,
    tx: mpsc::UnboundedSender<EditSubmission>,
}

impl EditSubmitter {
    pub fn new(original_name: impl Into<String>, tx: mpsc::UnboundedSender<EditSubmission>) -> Self {
        Self {
            original_name: original_name.into(),
            tx,
        }
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Hand the edited tag back to the core. Returns false if nobody is listening.
    pub fn submit(self, tag: Tag) -> bool {
        self.tx
            .send(EditSubmission {
                original_name: self.original_name,
                tag,
            })
            .is_ok()
    }
}

/// Edit dialog owned by the UI. `open` returns immediately; the edit
/// arrives later through the submitter, or never if the user cancels.
pub trait EditDialog: Send + Sync {
    fn open(&self, tag: Tag, submitter: EditSubmitter);
}
