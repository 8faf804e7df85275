//! Mock document store for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::document::{DocumentBody, DocumentError, DocumentHandle, DocumentStore};

use super::fixtures;

/// A document created through the mock, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDocument {
    pub handle: DocumentHandle,
    pub template_id: String,
    pub folder_id: String,
    /// Body as last saved; `None` until `save_and_close`.
    pub body: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    templates: HashMap<String, String>,
    folders: HashSet<String>,
    documents: Vec<(RecordedDocument, String)>,
    next_error: Option<DocumentError>,
    failing_names: HashSet<String>,
    fail_next_save: bool,
}

/// Mock implementation of the DocumentStore trait.
///
/// Provides controllable behavior for testing:
/// - Register templates and folders
/// - Inspect created and saved documents
/// - Fail the next duplication, or every duplication for a given name
///
/// # Example
///
/// ```rust,ignore
/// use ticketcard_core::testing::{fixtures, MockDocumentStore};
///
/// let documents = MockDocumentStore::with_template(fixtures::CARD_TEMPLATE);
/// // ... run the card stage ...
/// assert_eq!(documents.saved_documents().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDocumentStore {
    inner: Mutex<Inner>,
}

impl MockDocumentStore {
    /// Create an empty store: no templates, no folders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `text` under the fixture template and folder ids.
    pub fn with_template(text: &str) -> Self {
        let store = Self::new();
        store.add_template(fixtures::TEMPLATE_ID, text);
        store.add_folder(fixtures::FOLDER_ID);
        store
    }

    pub fn add_template(&self, template_id: &str, text: &str) {
        self.inner
            .lock()
            .unwrap()
            .templates
            .insert(template_id.to_string(), text.to_string());
    }

    pub fn add_folder(&self, folder_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .folders
            .insert(folder_id.to_string());
    }

    /// Configure the next duplication to fail with the given error.
    pub fn set_next_error(&self, error: DocumentError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Fail every duplication under `name` until cleared.
    pub fn fail_documents_named(&self, name: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_names
            .insert(name.to_string());
    }

    /// Fail the next `save_and_close`.
    pub fn fail_next_save(&self) {
        self.inner.lock().unwrap().fail_next_save = true;
    }

    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_error = None;
        inner.failing_names.clear();
        inner.fail_next_save = false;
    }

    /// Every document created and not discarded, saved or not.
    pub fn created_documents(&self) -> Vec<RecordedDocument> {
        self.inner
            .lock()
            .unwrap()
            .documents
            .iter()
            .map(|(record, _)| record.clone())
            .collect()
    }

    /// Documents that were saved and closed.
    pub fn saved_documents(&self) -> Vec<RecordedDocument> {
        self.created_documents()
            .into_iter()
            .filter(|d| d.body.is_some())
            .collect()
    }
}

impl DocumentStore for MockDocumentStore {
    fn name(&self) -> &str {
        "mock"
    }

    fn duplicate(
        &self,
        template_id: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<DocumentHandle, DocumentError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.next_error.take() {
            return Err(error);
        }
        let template = inner
            .templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| DocumentError::TemplateNotFound {
                template_id: template_id.to_string(),
            })?;
        if !inner.folders.contains(folder_id) {
            return Err(DocumentError::FolderNotFound {
                folder_id: folder_id.to_string(),
            });
        }
        if inner.failing_names.contains(name) {
            return Err(DocumentError::Io(std::io::Error::other(format!(
                "simulated failure creating '{}'",
                name
            ))));
        }

        let handle = DocumentHandle {
            id: format!("mock-doc-{}", inner.documents.len() + 1),
            name: name.to_string(),
            location: format!("{}/{}", folder_id, name),
        };
        let record = RecordedDocument {
            handle: handle.clone(),
            template_id: template_id.to_string(),
            folder_id: folder_id.to_string(),
            body: None,
        };
        inner.documents.push((record, template));
        Ok(handle)
    }

    fn open_body(&self, handle: &DocumentHandle) -> Result<DocumentBody, DocumentError> {
        let inner = self.inner.lock().unwrap();
        inner
            .documents
            .iter()
            .find(|(record, _)| record.handle.id == handle.id)
            .map(|(_, content)| DocumentBody::new(content.clone()))
            .ok_or_else(|| DocumentError::DocumentNotFound {
                location: handle.location.clone(),
            })
    }

    fn save_and_close(
        &self,
        handle: &DocumentHandle,
        body: DocumentBody,
    ) -> Result<(), DocumentError> {
        let mut inner = self.inner.lock().unwrap();
        if std::mem::take(&mut inner.fail_next_save) {
            return Err(DocumentError::SaveFailed {
                path: handle.location.clone().into(),
                source: std::io::Error::other("simulated save failure"),
            });
        }
        let (record, content) = inner
            .documents
            .iter_mut()
            .find(|(record, _)| record.handle.id == handle.id)
            .ok_or_else(|| DocumentError::DocumentNotFound {
                location: handle.location.clone(),
            })?;
        let text = body.into_text();
        record.body = Some(text.clone());
        *content = text;
        Ok(())
    }

    fn discard(&self, handle: &DocumentHandle) -> Result<(), DocumentError> {
        self.inner
            .lock()
            .unwrap()
            .documents
            .retain(|(record, _)| record.handle.id != handle.id);
        Ok(())
    }

    fn validate(&self, template_id: &str, folder_id: &str) -> Result<(), DocumentError> {
        let inner = self.inner.lock().unwrap();
        if !inner.templates.contains_key(template_id) {
            return Err(DocumentError::TemplateNotFound {
                template_id: template_id.to_string(),
            });
        }
        if !inner.folders.contains(folder_id) {
            return Err(DocumentError::FolderNotFound {
                folder_id: folder_id.to_string(),
            });
        }
        Ok(())
    }
}
