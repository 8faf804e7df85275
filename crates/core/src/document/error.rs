//! Error types for the document module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Template identifier does not resolve to a document.
    #[error("Template not found: {template_id}")]
    TemplateNotFound { template_id: String },

    /// Destination folder identifier does not resolve to a folder.
    #[error("Destination folder not found: {folder_id}")]
    FolderNotFound { folder_id: String },

    /// Identifier cannot be resolved inside the store.
    #[error("Invalid document identifier: {id}")]
    InvalidIdentifier { id: String },

    /// A previously created document has disappeared.
    #[error("Document not found: {location}")]
    DocumentNotFound { location: String },

    /// Document body is not text.
    #[error("Document body is not UTF-8 text: {path}")]
    NotText { path: PathBuf },

    /// Failed to create the duplicate.
    #[error("Failed to create document {path}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the body back.
    #[error("Failed to save document {path}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// Whether this is a configuration error that no row-level retry can fix.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::TemplateNotFound { .. } | Self::FolderNotFound { .. } | Self::InvalidIdentifier { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(DocumentError::TemplateNotFound {
            template_id: "t".to_string()
        }
        .is_fatal());
        assert!(DocumentError::FolderNotFound {
            folder_id: "f".to_string()
        }
        .is_fatal());
        assert!(!DocumentError::DocumentNotFound {
            location: "x".to_string()
        }
        .is_fatal());
        assert!(!DocumentError::Io(std::io::Error::other("boom")).is_fatal());
    }
}
