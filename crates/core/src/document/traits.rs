//! Trait definitions for the document module.

use super::error::DocumentError;
use super::types::{DocumentBody, DocumentHandle};

/// A store that can duplicate templates and edit the copies.
pub trait DocumentStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Duplicates the template into the destination folder under `name`.
    fn duplicate(
        &self,
        template_id: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<DocumentHandle, DocumentError>;

    /// Opens a document's text body for editing.
    fn open_body(&self, handle: &DocumentHandle) -> Result<DocumentBody, DocumentError>;

    /// Writes the body back and closes the document.
    fn save_and_close(&self, handle: &DocumentHandle, body: DocumentBody)
        -> Result<(), DocumentError>;

    /// Deletes a document, e.g. a copy whose edit never completed.
    fn discard(&self, handle: &DocumentHandle) -> Result<(), DocumentError>;

    /// Checks that the template and destination folder are reachable.
    fn validate(&self, template_id: &str, folder_id: &str) -> Result<(), DocumentError>;
}
