//! Document handle and body types.

use serde::Serialize;

/// Handle to a document created by a [`DocumentStore`](super::DocumentStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHandle {
    /// Store-assigned identifier.
    pub id: String,
    /// Display name the document was created with.
    pub name: String,
    /// Store-specific location (a file path for the filesystem store).
    pub location: String,
}

/// Editable text body of an open document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentBody {
    text: String,
}

impl DocumentBody {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Replace every literal occurrence of `token`. Returns the number replaced.
    pub fn replace_text(&mut self, token: &str, replacement: &str) -> usize {
        if token.is_empty() {
            return 0;
        }
        let count = self.text.matches(token).count();
        if count > 0 {
            self.text = self.text.replace(token, replacement);
        }
        count
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
